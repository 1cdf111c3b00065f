//! Doctor search orchestration: filter state in, card view model out

use serde::{Deserialize, Serialize};

use crate::model::{DoctorCard, SeguroRef};
use crate::page::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, Page};
use crate::text::non_empty;

/// Filters selected by the patient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilters {
    pub ubigeo_id: Option<String>,
    pub especialidad_id: Option<String>,
    pub seguro_id: Option<String>,
    pub rimac_ensured: Option<bool>,
    pub page: u32,
    pub page_size: u32,
    pub enabled: bool,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            ubigeo_id: None,
            especialidad_id: None,
            seguro_id: None,
            rimac_ensured: None,
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            enabled: true,
        }
    }
}

impl SearchFilters {
    /// Whether a fetch should be issued at all.
    ///
    /// At least one filter must be selected; blank strings do not count.
    pub fn is_ready(&self) -> bool {
        let has_filter = non_empty(self.ubigeo_id.as_deref()).is_some()
            || non_empty(self.especialidad_id.as_deref()).is_some()
            || non_empty(self.seguro_id.as_deref()).is_some()
            || self.rimac_ensured.is_some();
        self.enabled && has_filter
    }

    /// Query parameters for the doctor search, in a stable order
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("pageSize", self.page_size.to_string()),
        ];
        let optional = [
            ("ubigeoId", self.ubigeo_id.as_deref()),
            ("especialidadId", self.especialidad_id.as_deref()),
            ("seguroId", self.seguro_id.as_deref()),
        ];
        for (name, value) in optional {
            if let Some(value) = non_empty(value) {
                pairs.push((name, value.to_string()));
            }
        }
        if let Some(ensured) = self.rimac_ensured {
            pairs.push(("rimacEnsured", ensured.to_string()));
        }
        pairs
    }
}

/// Doctors sharing one clinic on the results screen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClinicGroup {
    pub clinic_id: Option<String>,
    pub clinic_name: Option<String>,
    pub clinic_address: Option<String>,
    pub seguros: Vec<SeguroRef>,
    pub doctors: Vec<DoctorCard>,
}

/// Group cards by clinic, keeping the order in which clinics first appear
pub fn group_by_clinic(cards: Vec<DoctorCard>) -> Vec<ClinicGroup> {
    let mut groups: Vec<ClinicGroup> = Vec::new();
    for card in cards {
        match groups.iter_mut().find(|g| g.clinic_id == card.clinic_id) {
            Some(group) => group.doctors.push(card),
            None => groups.push(ClinicGroup {
                clinic_id: card.clinic_id.clone(),
                clinic_name: card.clinic_name.clone(),
                clinic_address: card.clinic_address.clone(),
                seguros: card.seguros.clone(),
                doctors: vec![card],
            }),
        }
    }
    groups
}

/// Position of the current page within the full result set
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayRange {
    pub from: u64,
    pub to: u64,
}

/// Clinic-grouped search results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub range: Option<DisplayRange>,
    pub clinics: Vec<ClinicGroup>,
}

impl From<Page<DoctorCard>> for SearchResults {
    fn from(page: Page<DoctorCard>) -> Self {
        let range = page
            .display_range()
            .map(|(from, to)| DisplayRange { from, to });
        Self {
            page: page.page,
            page_size: page.page_size,
            total: page.total,
            range,
            clinics: group_by_clinic(page.items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(doctor: &str, clinic: &str) -> DoctorCard {
        DoctorCard {
            doctor_id: doctor.to_string(),
            doctor_name: format!("Dr. {doctor}"),
            photo_url: None,
            main_specialty: Some("Cardiología".to_string()),
            clinic_id: Some(clinic.to_string()),
            clinic_name: Some(format!("Clínica {clinic}")),
            clinic_address: None,
            seguros: vec![],
        }
    }

    #[test]
    fn test_not_ready_without_filters() {
        assert!(!SearchFilters::default().is_ready());

        let blank = SearchFilters {
            ubigeo_id: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(!blank.is_ready());
    }

    #[test]
    fn test_disabled_is_never_ready() {
        let filters = SearchFilters {
            especialidad_id: Some("8".to_string()),
            enabled: false,
            ..Default::default()
        };
        assert!(!filters.is_ready());
    }

    #[test]
    fn test_rimac_flag_alone_is_enough() {
        let filters = SearchFilters {
            rimac_ensured: Some(false),
            ..Default::default()
        };
        assert!(filters.is_ready());
        assert_eq!(
            filters.query_pairs(),
            vec![
                ("page", "1".to_string()),
                ("pageSize", "10".to_string()),
                ("rimacEnsured", "false".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_pairs_skip_blank() {
        let filters = SearchFilters {
            ubigeo_id: Some("150122".to_string()),
            especialidad_id: Some("".to_string()),
            seguro_id: Some("RIMAC".to_string()),
            page: 2,
            ..Default::default()
        };
        let names: Vec<_> = filters.query_pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["page", "pageSize", "ubigeoId", "seguroId"]);
    }

    #[test]
    fn test_group_by_clinic_keeps_first_seen_order() {
        let groups = group_by_clinic(vec![
            card("1", "B"),
            card("2", "A"),
            card("3", "B"),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].clinic_id.as_deref(), Some("B"));
        assert_eq!(groups[0].doctors.len(), 2);
        assert_eq!(groups[1].doctors[0].doctor_id, "2");
    }

    #[test]
    fn test_results_from_page() {
        let page = Page {
            items: vec![card("1", "A")],
            page: 2,
            page_size: 1,
            total: 3,
        };
        let results = SearchResults::from(page);
        assert_eq!(results.range, Some(DisplayRange { from: 2, to: 2 }));
        assert_eq!(results.clinics.len(), 1);
    }
}
