use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::map::MapDraft;
use crate::domain::photo::{PhotoId, UploadedPhoto};
use crate::domain::poi::{
    CoordinateSource, Coordinates, DraftPoi, MAX_PHOTOS_PER_MAP, MAX_PHOTOS_PER_POI, MAX_POIS,
};
use crate::usecase::error::AssemblyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStage {
    SelectingPhotos,
    GroupingIntoPoi,
    AllPhotosAssigned,
    ReadyToSubmit,
}

/// Transient state of the POI currently being put together.
#[derive(Debug, Clone, Default)]
pub struct PoiForm {
    selected: Vec<PhotoId>,
    primary: Option<PhotoId>,
    coordinate_source: Option<CoordinateSource>,
    name: String,
    description: String,
    date_visited: Option<NaiveDate>,
    tags: Vec<String>,
}

impl PoiForm {
    pub fn selected(&self) -> &[PhotoId] {
        &self.selected
    }

    pub fn primary_index(&self) -> Option<usize> {
        let primary = self.primary?;
        self.selected.iter().position(|id| *id == primary)
    }

    pub fn coordinate_source(&self) -> Option<CoordinateSource> {
        self.coordinate_source
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn date_visited(&self) -> Option<NaiveDate> {
        self.date_visited
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// One map-creation session: the photo pool, the committed POIs and the
/// POI form in progress.
///
/// "Unassigned" is never stored. It is always recomputed as the pool minus
/// the photos of every committed POI, so assigning and unassigning cannot
/// drift apart.
#[derive(Debug, Default)]
pub struct UploadSession {
    map_name: String,
    photos: Vec<Arc<UploadedPhoto>>,
    pois: Vec<DraftPoi>,
    form: PoiForm,
}

impl UploadSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map_name(&self) -> &str {
        &self.map_name
    }

    pub fn set_map_name(&mut self, name: impl Into<String>) {
        self.map_name = name.into();
    }

    pub fn photos(&self) -> &[Arc<UploadedPhoto>] {
        &self.photos
    }

    pub fn pois(&self) -> &[DraftPoi] {
        &self.pois
    }

    pub fn form(&self) -> &PoiForm {
        &self.form
    }

    #[tracing::instrument(skip_all, fields(count = photos.len(), pool = self.photos.len()))]
    pub fn add_photos(&mut self, photos: Vec<UploadedPhoto>) -> Result<(), AssemblyError> {
        if self.photos.len() + photos.len() > MAX_PHOTOS_PER_MAP {
            tracing::warn!("photo limit exceeded");
            return Err(AssemblyError::TooManyUploads);
        }
        self.photos.extend(photos.into_iter().map(Arc::new));
        Ok(())
    }

    /// Discards an unassigned photo. Its preview is released once nothing
    /// else holds the photo.
    #[tracing::instrument(skip(self))]
    pub fn remove_photo(&mut self, id: PhotoId) -> Result<(), AssemblyError> {
        if self.pois.iter().any(|poi| poi.contains(id)) {
            return Err(AssemblyError::PhotoAssigned(id));
        }
        let pos = self
            .photos
            .iter()
            .position(|p| p.id == id)
            .ok_or(AssemblyError::PhotoUnavailable(id))?;

        if self.form.selected.contains(&id) {
            self.deselect_photo(id)?;
        }
        self.photos.remove(pos);

        tracing::debug!("photo removed from pool");
        Ok(())
    }

    fn assigned_ids(&self) -> HashSet<PhotoId> {
        self.pois
            .iter()
            .flat_map(|poi| poi.photos().iter().map(|p| p.id))
            .collect()
    }

    pub fn unassigned_photos(&self) -> Vec<&Arc<UploadedPhoto>> {
        let assigned = self.assigned_ids();
        self.photos
            .iter()
            .filter(|p| !assigned.contains(&p.id))
            .collect()
    }

    fn find_photo(&self, id: PhotoId) -> Option<&Arc<UploadedPhoto>> {
        self.photos.iter().find(|p| p.id == id)
    }

    pub fn select_photo(&mut self, id: PhotoId) -> Result<(), AssemblyError> {
        if self.form.selected.contains(&id) {
            return Ok(());
        }
        if self.find_photo(id).is_none() {
            return Err(AssemblyError::PhotoUnavailable(id));
        }
        if self.assigned_ids().contains(&id) {
            return Err(AssemblyError::PhotoAssigned(id));
        }
        if self.form.selected.len() >= MAX_PHOTOS_PER_POI {
            tracing::debug!(%id, "selection full");
            return Err(AssemblyError::TooManyPhotos);
        }

        self.form.selected.push(id);
        self.on_selection_changed();
        Ok(())
    }

    pub fn deselect_photo(&mut self, id: PhotoId) -> Result<(), AssemblyError> {
        let pos = self
            .form
            .selected
            .iter()
            .position(|selected| *selected == id)
            .ok_or(AssemblyError::PhotoUnavailable(id))?;

        self.form.selected.remove(pos);
        if self.form.primary == Some(id) {
            self.form.primary = None;
        }
        if self.form.coordinate_source == Some(CoordinateSource::Photo(id)) {
            self.form.coordinate_source = None;
        }
        self.on_selection_changed();
        Ok(())
    }

    pub fn toggle_photo(&mut self, id: PhotoId) -> Result<(), AssemblyError> {
        if self.form.selected.contains(&id) {
            self.deselect_photo(id)
        } else {
            self.select_photo(id)
        }
    }

    fn on_selection_changed(&mut self) {
        if self.form.primary.is_none() {
            self.form.primary = self.form.selected.first().copied();
        }

        let date = self
            .form
            .selected
            .iter()
            .take(MAX_PHOTOS_PER_POI)
            .filter_map(|id| self.find_photo(*id))
            .find_map(|photo| photo.date_visited())
            .map(|dt| dt.date());
        self.form.date_visited = date;
    }

    pub fn set_primary(&mut self, index: usize) -> Result<(), AssemblyError> {
        let id = *self
            .form
            .selected
            .get(index)
            .ok_or(AssemblyError::PrimaryOutOfRange(index))?;
        self.form.primary = Some(id);
        Ok(())
    }

    /// Selected photos that can serve as the coordinate source.
    pub fn gps_candidates(&self) -> Vec<&Arc<UploadedPhoto>> {
        self.form
            .selected
            .iter()
            .filter_map(|id| self.find_photo(*id))
            .filter(|photo| photo.has_gps())
            .collect()
    }

    pub fn use_photo_coordinates(&mut self, id: PhotoId) -> Result<(), AssemblyError> {
        if !self.form.selected.contains(&id) {
            return Err(AssemblyError::PhotoUnavailable(id));
        }
        let photo = self
            .find_photo(id)
            .ok_or(AssemblyError::PhotoUnavailable(id))?;
        let Some(coordinates) = photo.coordinates() else {
            return Err(AssemblyError::PhotoWithoutGps(id));
        };
        if !coordinates.is_valid() {
            return Err(AssemblyError::InvalidCoordinates {
                lat: coordinates.lat,
                lng: coordinates.lng,
            });
        }
        self.form.coordinate_source = Some(CoordinateSource::Photo(id));
        Ok(())
    }

    pub fn use_manual_coordinates(&mut self, coordinates: Coordinates) -> Result<(), AssemblyError> {
        if !coordinates.is_valid() {
            return Err(AssemblyError::InvalidCoordinates {
                lat: coordinates.lat,
                lng: coordinates.lng,
            });
        }
        self.form.coordinate_source = Some(CoordinateSource::Manual(coordinates));
        Ok(())
    }

    pub fn set_poi_name(&mut self, name: impl Into<String>) {
        self.form.name = name.into();
    }

    pub fn set_poi_description(&mut self, description: impl Into<String>) {
        self.form.description = description.into();
    }

    pub fn set_poi_date(&mut self, date: Option<NaiveDate>) {
        self.form.date_visited = date;
    }

    pub fn add_tag(&mut self, tag: &str) -> Result<(), AssemblyError> {
        let tag = tag.trim();
        if tag.is_empty() || self.form.tags.iter().any(|t| t == tag) {
            return Err(AssemblyError::InvalidTag(tag.to_string()));
        }
        self.form.tags.push(tag.to_string());
        Ok(())
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.form.tags.len();
        self.form.tags.retain(|t| t != tag);
        self.form.tags.len() != before
    }

    fn resolved_coordinates(&self) -> Option<Coordinates> {
        match self.form.coordinate_source? {
            CoordinateSource::Photo(id) => self.find_photo(id)?.coordinates(),
            CoordinateSource::Manual(coordinates) => Some(coordinates),
        }
    }

    /// Validates the form and appends it as a new POI. Checks run in a fixed
    /// order and the first failure is returned with nothing changed.
    #[tracing::instrument(skip(self), fields(poi_count = self.pois.len(), selected = self.form.selected.len()))]
    pub fn commit_poi(&mut self) -> Result<&DraftPoi, AssemblyError> {
        if self.pois.len() >= MAX_POIS {
            return Err(AssemblyError::TooManyPois);
        }
        if self.form.selected.is_empty() {
            return Err(AssemblyError::NoPhotosSelected);
        }
        if self.form.selected.len() > MAX_PHOTOS_PER_POI {
            return Err(AssemblyError::TooManyPhotos);
        }
        let primary_index = self
            .form
            .primary_index()
            .filter(|i| *i < self.form.selected.len())
            .ok_or(AssemblyError::NoPrimaryPhoto)?;
        let name = self.form.name.trim();
        if name.is_empty() {
            return Err(AssemblyError::MissingName);
        }
        let coordinates = self
            .resolved_coordinates()
            .ok_or(AssemblyError::MissingCoordinates)?;

        let photos = self
            .form
            .selected
            .iter()
            .map(|id| {
                self.find_photo(*id)
                    .cloned()
                    .ok_or(AssemblyError::PhotoUnavailable(*id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let description = Some(self.form.description.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        let poi = DraftPoi::new(
            name.to_string(),
            description,
            self.form.date_visited,
            self.form.tags.clone(),
            photos,
            self.form.selected[primary_index],
            coordinates,
        );

        self.pois.push(poi);
        self.form = PoiForm::default();

        tracing::info!(
            poi_index = self.pois.len() - 1,
            unassigned = self.unassigned_photos().len(),
            "POI added"
        );
        Ok(&self.pois[self.pois.len() - 1])
    }

    /// Drops a committed POI; its photos show up as unassigned again.
    #[tracing::instrument(skip(self))]
    pub fn delete_poi(&mut self, index: usize) -> Result<DraftPoi, AssemblyError> {
        if index >= self.pois.len() {
            return Err(AssemblyError::UnknownPoi(index));
        }
        let poi = self.pois.remove(index);
        tracing::debug!(name = %poi.name(), photos = poi.photos().len(), "POI deleted");
        Ok(poi)
    }

    pub fn can_proceed(&self) -> bool {
        !self.pois.is_empty() && self.unassigned_photos().is_empty()
    }

    pub fn stage(&self) -> WizardStage {
        if self.can_proceed() {
            if self.map_name.trim().is_empty() {
                WizardStage::AllPhotosAssigned
            } else {
                WizardStage::ReadyToSubmit
            }
        } else if self.form.selected.is_empty() {
            WizardStage::SelectingPhotos
        } else {
            WizardStage::GroupingIntoPoi
        }
    }

    /// Snapshot of the finished session, ready for submission.
    pub fn finalize(&self) -> Result<MapDraft, AssemblyError> {
        let name = self.map_name.trim();
        if name.is_empty() {
            return Err(AssemblyError::MissingMapName);
        }
        if self.pois.is_empty() {
            return Err(AssemblyError::NoPois);
        }
        let unassigned = self.unassigned_photos().len();
        if unassigned > 0 {
            return Err(AssemblyError::UnassignedPhotos(unassigned));
        }
        Ok(MapDraft::new(name.to_string(), self.pois.clone()))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
        tracing::debug!("upload session reset");
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::domain::photo::fixtures::photo;

    /// Session whose map is ready to submit: one POI per
    /// `(name, lat, lng, photo_count)`, located at its first photo.
    pub fn ready_session(map_name: &str, pois: &[(&str, f64, f64, usize)]) -> UploadSession {
        let mut session = UploadSession::new();
        session.set_map_name(map_name);
        for (name, lat, lng, photo_count) in pois {
            let photos: Vec<UploadedPhoto> = (0..*photo_count)
                .map(|i| photo(&format!("{name}-{i}.jpg"), Some((*lat, *lng)), None))
                .collect();
            let ids: Vec<PhotoId> = photos.iter().map(|p| p.id).collect();
            session.add_photos(photos).unwrap();
            for id in &ids {
                session.select_photo(*id).unwrap();
            }
            session.use_photo_coordinates(ids[0]).unwrap();
            session.set_poi_name(*name);
            session.commit_poi().unwrap();
        }
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::photo::fixtures::photo;

    fn session_with(photos: Vec<UploadedPhoto>) -> (UploadSession, Vec<PhotoId>) {
        let ids = photos.iter().map(|p| p.id).collect();
        let mut session = UploadSession::new();
        session.add_photos(photos).unwrap();
        (session, ids)
    }

    fn gps_photo(name: &str) -> UploadedPhoto {
        photo(name, Some((10.0, 20.0)), None)
    }

    #[test]
    fn test_paris_day_one() {
        let (mut session, ids) = session_with(vec![
            photo("eiffel.jpg", Some((48.8584, 2.2945)), Some("2024-05-01 10:00:00")),
            photo("louvre.jpg", Some((48.8606, 2.3376)), Some("2024-05-02 11:00:00")),
        ]);
        session.set_map_name("France");

        session.select_photo(ids[0]).unwrap();
        session.select_photo(ids[1]).unwrap();
        session.set_primary(0).unwrap();
        session.use_photo_coordinates(ids[0]).unwrap();
        session.set_poi_name("Paris Day 1");

        let poi = session.commit_poi().unwrap();

        assert_eq!(poi.coordinates(), Coordinates::new(48.8584, 2.2945));
        assert_eq!(poi.date_visited(), NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(poi.photos().len(), 2);
        assert_eq!(poi.primary_photo_id(), ids[0]);
        assert_eq!(session.stage(), WizardStage::ReadyToSubmit);
    }

    #[test]
    fn test_photo_without_date_leaves_date_blank() {
        let (mut session, ids) = session_with(vec![photo("a.jpg", None, None)]);

        session.select_photo(ids[0]).unwrap();
        session
            .use_manual_coordinates(Coordinates::new(1.0, 2.0))
            .unwrap();
        session.set_poi_name("Somewhere");

        assert_eq!(session.form().date_visited(), None);
        let poi = session.commit_poi().unwrap();
        assert_eq!(poi.date_visited(), None);
    }

    #[test]
    fn test_default_date_scans_selection_in_order() {
        let (mut session, ids) = session_with(vec![
            photo("a.jpg", None, None),
            photo("b.jpg", None, Some("2024-05-03 09:00:00")),
            photo("c.jpg", None, Some("2024-05-02 09:00:00")),
        ]);

        session.select_photo(ids[0]).unwrap();
        assert_eq!(session.form().date_visited(), None);

        session.select_photo(ids[1]).unwrap();
        session.select_photo(ids[2]).unwrap();
        assert_eq!(session.form().date_visited(), NaiveDate::from_ymd_opt(2024, 5, 3));

        session.deselect_photo(ids[1]).unwrap();
        assert_eq!(session.form().date_visited(), NaiveDate::from_ymd_opt(2024, 5, 2));
    }

    #[test]
    fn test_fourth_photo_rejected_without_change() {
        let (mut session, ids) = session_with((0..4).map(|i| gps_photo(&format!("{i}.jpg"))).collect());
        for id in &ids[..3] {
            session.select_photo(*id).unwrap();
        }

        let err = session.select_photo(ids[3]).unwrap_err();

        assert_eq!(err, AssemblyError::TooManyPhotos);
        assert_eq!(err.to_string(), "A POI can have up to 3 photos");
        assert_eq!(session.form().selected(), &ids[..3]);
    }

    #[test]
    fn test_twenty_sixth_poi_rejected() {
        let (mut session, ids) = session_with((0..26).map(|i| gps_photo(&format!("{i}.jpg"))).collect());
        for id in &ids[..25] {
            session.select_photo(*id).unwrap();
            session.use_photo_coordinates(*id).unwrap();
            session.set_poi_name("stop");
            session.commit_poi().unwrap();
        }
        session.select_photo(ids[25]).unwrap();
        session.use_photo_coordinates(ids[25]).unwrap();
        session.set_poi_name("one too many");

        let err = session.commit_poi().unwrap_err();

        assert_eq!(err, AssemblyError::TooManyPois);
        assert_eq!(session.pois().len(), 25);
        assert_eq!(session.form().selected(), &[ids[25]]);
    }

    #[test]
    fn test_commit_validation_order() {
        let (mut session, ids) = session_with(vec![photo("a.jpg", None, None)]);

        assert_eq!(session.commit_poi().unwrap_err(), AssemblyError::NoPhotosSelected);

        session.select_photo(ids[0]).unwrap();
        assert_eq!(session.commit_poi().unwrap_err(), AssemblyError::MissingName);

        session.set_poi_name("   ");
        assert_eq!(session.commit_poi().unwrap_err(), AssemblyError::MissingName);

        session.set_poi_name("Name");
        assert_eq!(session.commit_poi().unwrap_err(), AssemblyError::MissingCoordinates);

        session
            .use_manual_coordinates(Coordinates::new(0.0, 0.0))
            .unwrap();
        assert!(session.commit_poi().is_ok());
    }

    #[test]
    fn test_primary_defaults_and_resets() {
        let (mut session, ids) = session_with(vec![gps_photo("a.jpg"), gps_photo("b.jpg")]);

        session.select_photo(ids[0]).unwrap();
        session.select_photo(ids[1]).unwrap();
        assert_eq!(session.form().primary_index(), Some(0));

        session.set_primary(1).unwrap();
        assert_eq!(session.form().primary_index(), Some(1));

        session.deselect_photo(ids[1]).unwrap();
        assert_eq!(session.form().primary_index(), Some(0));

        session.deselect_photo(ids[0]).unwrap();
        assert_eq!(session.form().primary_index(), None);

        assert_eq!(
            session.set_primary(0).unwrap_err(),
            AssemblyError::PrimaryOutOfRange(0)
        );
    }

    #[test]
    fn test_primary_follows_photo_not_position() {
        let (mut session, ids) =
            session_with(vec![gps_photo("a.jpg"), gps_photo("b.jpg"), gps_photo("c.jpg")]);
        for id in &ids {
            session.select_photo(*id).unwrap();
        }
        session.set_primary(2).unwrap();

        session.deselect_photo(ids[0]).unwrap();

        assert_eq!(session.form().primary_index(), Some(1));
    }

    #[test]
    fn test_coordinate_source_is_exclusive() {
        let (mut session, ids) = session_with(vec![gps_photo("a.jpg"), photo("b.jpg", None, None)]);
        session.select_photo(ids[0]).unwrap();
        session.select_photo(ids[1]).unwrap();

        assert_eq!(session.gps_candidates().len(), 1);
        assert_eq!(
            session.use_photo_coordinates(ids[1]).unwrap_err(),
            AssemblyError::PhotoWithoutGps(ids[1])
        );

        session.use_photo_coordinates(ids[0]).unwrap();
        session
            .use_manual_coordinates(Coordinates::new(5.0, 6.0))
            .unwrap();
        assert_eq!(
            session.form().coordinate_source(),
            Some(CoordinateSource::Manual(Coordinates::new(5.0, 6.0)))
        );

        session.use_photo_coordinates(ids[0]).unwrap();
        session.deselect_photo(ids[0]).unwrap();
        assert_eq!(session.form().coordinate_source(), None);
    }

    #[test]
    fn test_manual_coordinates_validated() {
        let mut session = UploadSession::new();
        assert!(matches!(
            session.use_manual_coordinates(Coordinates::new(91.0, 0.0)),
            Err(AssemblyError::InvalidCoordinates { .. })
        ));
        assert_eq!(session.form().coordinate_source(), None);
    }

    #[test]
    fn test_photo_coordinates_validated() {
        let (mut session, ids) = session_with(vec![photo("bad.jpg", Some((f64::NAN, 2.0)), None)]);
        session.select_photo(ids[0]).unwrap();

        assert!(matches!(
            session.use_photo_coordinates(ids[0]),
            Err(AssemblyError::InvalidCoordinates { .. })
        ));
        assert_eq!(session.form().coordinate_source(), None);
    }

    #[test]
    fn test_assigned_photo_cannot_be_reselected() {
        let (mut session, ids) = session_with(vec![gps_photo("a.jpg"), gps_photo("b.jpg")]);
        session.select_photo(ids[0]).unwrap();
        session.use_photo_coordinates(ids[0]).unwrap();
        session.set_poi_name("A");
        session.commit_poi().unwrap();

        assert_eq!(
            session.select_photo(ids[0]).unwrap_err(),
            AssemblyError::PhotoAssigned(ids[0])
        );

        session.select_photo(ids[1]).unwrap();
        session.use_photo_coordinates(ids[1]).unwrap();
        session.set_poi_name("B");
        session.commit_poi().unwrap();

        let a: HashSet<PhotoId> = session.pois()[0].photos().iter().map(|p| p.id).collect();
        let b: HashSet<PhotoId> = session.pois()[1].photos().iter().map(|p| p.id).collect();
        assert!(a.is_disjoint(&b));
    }

    #[test]
    fn test_commit_resets_form_and_shrinks_pool() {
        let (mut session, ids) = session_with(vec![gps_photo("a.jpg"), gps_photo("b.jpg")]);
        session.select_photo(ids[0]).unwrap();
        session.use_photo_coordinates(ids[0]).unwrap();
        session.set_poi_name("A");
        session.set_poi_description("desc");
        session.add_tag("beach").unwrap();
        session.commit_poi().unwrap();

        assert!(session.form().selected().is_empty());
        assert_eq!(session.form().name(), "");
        assert!(session.form().tags().is_empty());
        assert_eq!(session.form().coordinate_source(), None);
        let unassigned: Vec<PhotoId> = session.unassigned_photos().iter().map(|p| p.id).collect();
        assert_eq!(unassigned, vec![ids[1]]);
        assert_eq!(session.pois()[0].description(), Some("desc"));
        assert_eq!(session.pois()[0].tags(), &["beach".to_string()]);
    }

    #[test]
    fn test_delete_poi_returns_photos_to_pool() {
        let (mut session, ids) = session_with(vec![gps_photo("a.jpg")]);
        session.set_map_name("Trip");
        session.select_photo(ids[0]).unwrap();
        session.use_photo_coordinates(ids[0]).unwrap();
        session.set_poi_name("A");
        session.commit_poi().unwrap();
        assert!(session.can_proceed());

        let removed = session.delete_poi(0).unwrap();

        assert_eq!(removed.name(), "A");
        assert_eq!(session.unassigned_photos().len(), 1);
        assert!(!session.can_proceed());
        assert_eq!(session.delete_poi(0).unwrap_err(), AssemblyError::UnknownPoi(0));
    }

    #[test]
    fn test_cannot_proceed_with_unassigned_photos() {
        let (mut session, ids) = session_with(vec![gps_photo("a.jpg"), gps_photo("b.jpg")]);
        session.set_map_name("Trip");
        assert_eq!(session.finalize().unwrap_err(), AssemblyError::NoPois);

        session.select_photo(ids[0]).unwrap();
        assert_eq!(session.stage(), WizardStage::GroupingIntoPoi);
        session.use_photo_coordinates(ids[0]).unwrap();
        session.set_poi_name("A");
        session.commit_poi().unwrap();

        assert_eq!(session.stage(), WizardStage::SelectingPhotos);
        assert!(!session.can_proceed());
        assert_eq!(
            session.finalize().unwrap_err(),
            AssemblyError::UnassignedPhotos(1)
        );
    }

    #[test]
    fn test_finalize_requires_map_name() {
        let (mut session, ids) = session_with(vec![gps_photo("a.jpg")]);
        session.select_photo(ids[0]).unwrap();
        session.use_photo_coordinates(ids[0]).unwrap();
        session.set_poi_name("A");
        session.commit_poi().unwrap();

        assert_eq!(session.stage(), WizardStage::AllPhotosAssigned);
        assert_eq!(session.finalize().unwrap_err(), AssemblyError::MissingMapName);

        session.set_map_name("  Trip ");
        let draft = session.finalize().unwrap();
        assert_eq!(draft.name(), "Trip");
        assert_eq!(draft.photo_count(), 1);
    }

    #[test]
    fn test_upload_cap() {
        let mut session = UploadSession::new();
        session
            .add_photos((0..75).map(|i| photo(&format!("{i}.jpg"), None, None)).collect())
            .unwrap();

        let err = session
            .add_photos(vec![photo("extra.jpg", None, None)])
            .unwrap_err();

        assert_eq!(err, AssemblyError::TooManyUploads);
        assert_eq!(session.photos().len(), 75);
    }

    #[test]
    fn test_remove_photo() {
        let (mut session, ids) = session_with(vec![gps_photo("a.jpg"), gps_photo("b.jpg")]);
        let preview = session.photos()[1].preview.path().to_path_buf();
        session.select_photo(ids[0]).unwrap();
        session.use_photo_coordinates(ids[0]).unwrap();
        session.set_poi_name("A");
        session.commit_poi().unwrap();

        assert_eq!(
            session.remove_photo(ids[0]).unwrap_err(),
            AssemblyError::PhotoAssigned(ids[0])
        );

        session.select_photo(ids[1]).unwrap();
        session.remove_photo(ids[1]).unwrap();

        assert!(session.form().selected().is_empty());
        assert_eq!(session.photos().len(), 1);
        assert!(!preview.exists());
    }

    #[test]
    fn test_tags() {
        let mut session = UploadSession::new();
        session.add_tag(" food ").unwrap();
        session.add_tag("museum").unwrap();

        assert_eq!(
            session.add_tag("food").unwrap_err(),
            AssemblyError::InvalidTag("food".to_string())
        );
        assert!(session.add_tag("  ").is_err());
        assert!(session.remove_tag("food"));
        assert!(!session.remove_tag("food"));
        assert_eq!(session.form().tags(), &["museum".to_string()]);
    }

    #[test]
    fn test_toggle_photo() {
        let (mut session, ids) = session_with(vec![gps_photo("a.jpg")]);

        session.toggle_photo(ids[0]).unwrap();
        assert_eq!(session.form().selected(), &[ids[0]]);

        session.toggle_photo(ids[0]).unwrap();
        assert!(session.form().selected().is_empty());
    }

    #[test]
    fn test_reset() {
        let mut session = test_support::ready_session("Trip", &[("A", 1.0, 2.0, 2)]);
        let preview = session.photos()[0].preview.path().to_path_buf();

        session.reset();

        assert_eq!(session.map_name(), "");
        assert!(session.photos().is_empty());
        assert!(session.pois().is_empty());
        assert!(!preview.exists());
    }
}
