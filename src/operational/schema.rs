//! Fixed field schemas of the operational API, one per [`StationKind`](crate::StationKind).
//!
//! The API serializes every value as a string (or `null`). Each field is coerced to the
//! declared type when a response is read, so all three response formats yield the same
//! typed columns in the same order.

/// Target type of an API field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Int,
    Float,
    Date,
    DateTime,
}

/// One column of an operational dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
    /// Alternative keys the API has used for the same field.
    pub aliases: &'static [&'static str],
}

impl FieldSpec {
    const fn new(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            aliases: &[],
        }
    }

    const fn aliased(
        name: &'static str,
        field_type: FieldType,
        aliases: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            field_type,
            aliases,
        }
    }

    /// Whether a response key names this field.
    pub fn matches(&self, key: &str) -> bool {
        self.name == key || self.aliases.contains(&key)
    }
}

use FieldType::{Date, DateTime, Float, Int, Text};

pub const SYNOP_SCHEMA: &[FieldSpec] = &[
    FieldSpec::new("id_stacji", Text),
    FieldSpec::new("stacja", Text),
    FieldSpec::new("data_pomiaru", Date),
    FieldSpec::new("godzina_pomiaru", Int),
    FieldSpec::new("temperatura", Float),
    FieldSpec::new("predkosc_wiatru", Float),
    FieldSpec::new("kierunek_wiatru", Int),
    FieldSpec::new("wilgotnosc_wzgledna", Float),
    FieldSpec::new("suma_opadu", Float),
    FieldSpec::new("cisnienie", Float),
];

pub const HYDRO_SCHEMA: &[FieldSpec] = &[
    FieldSpec::new("id_stacji", Text),
    FieldSpec::new("stacja", Text),
    FieldSpec::new("rzeka", Text),
    FieldSpec::aliased("wojewodztwo", Text, &["województwo"]),
    FieldSpec::new("stan_wody", Int),
    FieldSpec::new("stan_wody_data_pomiaru", DateTime),
    FieldSpec::new("temperatura_wody", Float),
    FieldSpec::new("temperatura_wody_data_pomiaru", DateTime),
    FieldSpec::new("przeplyw", Float),
    FieldSpec::aliased("przeplyw_data", DateTime, &["przeplyw_data_pomiaru"]),
    FieldSpec::new("zjawisko_lodowe", Int),
    FieldSpec::new("zjawisko_lodowe_data_pomiaru", DateTime),
    FieldSpec::new("zjawisko_zarastania", Int),
    FieldSpec::new("zjawisko_zarastania_data_pomiaru", DateTime),
];

pub const METEO_SCHEMA: &[FieldSpec] = &[
    FieldSpec::new("kod_stacji", Text),
    FieldSpec::new("nazwa_stacji", Text),
    FieldSpec::new("lon", Float),
    FieldSpec::new("lat", Float),
    FieldSpec::new("temperatura_gruntu", Float),
    FieldSpec::new("temperatura_gruntu_data", DateTime),
    FieldSpec::new("wiatr_kierunek", Int),
    FieldSpec::new("wiatr_kierunek_data", DateTime),
    FieldSpec::new("wiatr_srednia_predkosc", Float),
    FieldSpec::new("wiatr_srednia_predkosc_data", DateTime),
    FieldSpec::new("wiatr_predkosc_maksymalna", Float),
    FieldSpec::new("wiatr_predkosc_maksymalna_data", DateTime),
    FieldSpec::new("wilgotnosc_wzgledna", Float),
    FieldSpec::new("wilgotnosc_wzgledna_data", DateTime),
    FieldSpec::new("wiatr_poryw_10min", Float),
    FieldSpec::new("wiatr_poryw_10min_data", DateTime),
    FieldSpec::new("opad_10min", Float),
    FieldSpec::new("opad_10min_data", DateTime),
];
