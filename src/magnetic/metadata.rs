//! The text header (`<name>.wmm`) that describes a magnetic model.

use crate::ModelError;

const ID_LENGTH: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Normalization {
    /// Fully normalized associated Legendre functions
    Full,
    /// Schmidt semi-normalized associated Legendre functions
    Schmidt,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Endianness {
    Little,
    Big,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Metadata {
    pub name: String,
    pub description: String,
    pub release_date: String,
    pub radius: f64,
    pub epoch: f64,
    pub delta_epoch: f64,
    pub num_models: usize,
    pub num_constants: usize,
    pub min_time: f64,
    pub max_time: f64,
    pub min_height: f64,
    pub max_height: f64,
    pub normalization: Normalization,
    pub byte_order: Endianness,
    pub id: String,
}

impl Metadata {
    fn defaults(name: &str) -> Metadata {
        Self {
            name: name.to_string(),
            description: "NONE".to_string(),
            release_date: "UNKNOWN".to_string(),
            radius: f64::NAN,
            epoch: f64::NAN,
            delta_epoch: 1.,
            num_models: 1,
            num_constants: 0,
            min_time: f64::NEG_INFINITY,
            max_time: f64::INFINITY,
            min_height: f64::NEG_INFINITY,
            max_height: f64::INFINITY,
            normalization: Normalization::Schmidt,
            byte_order: Endianness::Little,
            id: String::new(),
        }
    }

    /// Number of harmonic sets in the coefficient file.
    pub fn num_sets(&self) -> usize {
        self.num_models + 1 + self.num_constants
    }
}

fn format_error(name: &str, msg: impl Into<String>) -> ModelError {
    ModelError::Format {
        name: name.to_string(),
        msg: msg.into(),
    }
}

fn number<T: std::str::FromStr>(name: &str, key: &str, value: &str) -> Result<T, ModelError> {
    value
        .parse()
        .map_err(|_| format_error(name, format!("{key} has a bad value {value:?}")))
}

/// Parses the header of model `name`.
pub(crate) fn parse(name: &str, text: &str) -> Result<Metadata, ModelError> {
    let mut lines = text.lines();
    let version = lines.next().map(str::trim_end).unwrap_or_default();
    let version = match version {
        "WMMF-1" => 1,
        "WMMF-2" => 2,
        _ => return Err(format_error(name, format!("bad header {version:?}"))),
    };

    let mut meta = Metadata::defaults(name);
    for line in lines {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let (key, value) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(k, v)| (k, v.trim()));

        match key {
            "Name" => meta.name = value.to_string(),
            "Description" => meta.description = value.to_string(),
            "ReleaseDate" => meta.release_date = value.to_string(),
            "Radius" => meta.radius = number(name, key, value)?,
            "Type" => {
                if value != "Linear" {
                    return Err(format_error(name, format!("only linear models are supported, not {value:?}")));
                }
            }
            "Epoch" => meta.epoch = number(name, key, value)?,
            "DeltaEpoch" => meta.delta_epoch = number(name, key, value)?,
            "NumModels" => meta.num_models = number(name, key, value)?,
            "NumConstants" => {
                if version < 2 {
                    return Err(format_error(name, "NumConstants needs WMMF-2"));
                }
                meta.num_constants = number(name, key, value)?;
            }
            "MinTime" => meta.min_time = number(name, key, value)?,
            "MaxTime" => meta.max_time = number(name, key, value)?,
            "MinHeight" => meta.min_height = number(name, key, value)?,
            "MaxHeight" => meta.max_height = number(name, key, value)?,
            "Normalization" => {
                meta.normalization = match value {
                    "Full" => Normalization::Full,
                    "Schmidt" => Normalization::Schmidt,
                    _ => return Err(format_error(name, format!("unknown normalization {value:?}"))),
                }
            }
            "ByteOrder" => {
                meta.byte_order = match value {
                    "Little" => Endianness::Little,
                    "Big" => Endianness::Big,
                    _ => return Err(format_error(name, format!("unknown byte order {value:?}"))),
                }
            }
            "ID" => meta.id = value.to_string(),
            // Informational keys such as URL and Publisher
            _ => {}
        }
    }

    if !(meta.radius.is_finite() && meta.radius > 0.) {
        return Err(format_error(name, "reference radius must be positive"));
    }
    if !meta.epoch.is_finite() {
        return Err(format_error(name, "epoch time not defined"));
    }
    if !(meta.delta_epoch.is_finite() && meta.delta_epoch > 0.) {
        return Err(format_error(name, "epoch spacing must be positive"));
    }
    if meta.num_models < 1 {
        return Err(format_error(name, "NumModels must be positive"));
    }
    if meta.num_constants > 1 {
        return Err(format_error(name, "NumConstants must be 0 or 1"));
    }
    if !(meta.min_time < meta.max_time) {
        return Err(format_error(name, "min time exceeds max time"));
    }
    if !(meta.min_height < meta.max_height) {
        return Err(format_error(name, "min height exceeds max height"));
    }
    if meta.id.len() != ID_LENGTH {
        return Err(format_error(name, format!("ID {:?} must be {ID_LENGTH} characters", meta.id)));
    }

    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WMM2020: &str = "WMMF-2
# A comment
Name            wmm2020
Description     World Magnetic Model 2020
URL             https://www.ngdc.noaa.gov/geomag/WMM/DoDWMM.shtml
ReleaseDate     2019-12-10
Radius          6371200
NumModels       1
Epoch           2020
DeltaEpoch      5
MinTime         2020
MaxTime         2025
MinHeight       -1000
MaxHeight       850000 # meters
Normalization   Schmidt
ID              WMM2020A
";

    #[test]
    fn parses_a_world_model_header() {
        let meta = parse("wmm2020", WMM2020).unwrap();
        assert_eq!(meta.description, "World Magnetic Model 2020");
        assert_eq!(meta.release_date, "2019-12-10");
        assert_eq!(meta.radius, 6_371_200.);
        assert_eq!((meta.epoch, meta.delta_epoch), (2020., 5.));
        assert_eq!((meta.min_time, meta.max_time), (2020., 2025.));
        assert_eq!((meta.min_height, meta.max_height), (-1000., 850_000.));
        assert_eq!(meta.normalization, Normalization::Schmidt);
        assert_eq!(meta.byte_order, Endianness::Little);
        assert_eq!(meta.id, "WMM2020A");
        assert_eq!(meta.num_sets(), 2);
    }

    #[test]
    fn missing_bounds_are_unlimited() {
        let meta = parse("x", "WMMF-1\nRadius 6371200\nEpoch 2000\nID ABCDEFGH\n").unwrap();
        assert_eq!(meta.name, "x");
        assert_eq!(meta.min_time, f64::NEG_INFINITY);
        assert_eq!(meta.max_height, f64::INFINITY);
    }

    #[test]
    fn rejects_bad_headers() {
        for text in [
            "WMMF-3\nRadius 1\nEpoch 2000\nID ABCDEFGH\n",
            "WMMF-2\nEpoch 2000\nID ABCDEFGH\n",
            "WMMF-2\nRadius 1\nID ABCDEFGH\n",
            "WMMF-2\nRadius 1\nEpoch 2000\nID SHORT\n",
            "WMMF-2\nRadius 1\nEpoch 2000\nID ABCDEFGH\nMinTime 2030\nMaxTime 2020\n",
            "WMMF-2\nRadius one\nEpoch 2000\nID ABCDEFGH\n",
            "WMMF-1\nRadius 1\nEpoch 2000\nNumConstants 1\nID ABCDEFGH\n",
            "WMMF-2\nRadius 1\nEpoch 2000\nNormalization Weird\nID ABCDEFGH\n",
        ] {
            assert!(matches!(parse("bad", text), Err(ModelError::Format { .. })), "{text}");
        }
    }
}
