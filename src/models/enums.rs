use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ModelError;

/// Macro to generate a closed enum with `as_str` + `std::str::FromStr` and
/// string-based serde, so the wire form is always the canonical label.
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

str_enum!(
    /// Patient sex as printed on the report.
    Gender {
        Male => "Male",
        Female => "Female",
        Other => "Other",
    }
);

str_enum!(
    /// Catalog key for every supported test. Each variant owns its
    /// input, assembly and layout rules (see `catalog` and `normalize`).
    TestKind {
        Widal => "widal_test",
        BloodGrouping => "blood_grouping",
        Crp => "crp_test",
    }
);

str_enum!(
    /// Single-test forms replace the selection on each pick;
    /// multi-test forms toggle tests independently.
    FormMode {
        Single => "single",
        Multiple => "multiple",
    }
);

str_enum!(AboGroup {
    A => "A",
    B => "B",
    AB => "AB",
    O => "O",
});

str_enum!(RhFactor {
    Positive => "Positive",
    Negative => "Negative",
});

str_enum!(CrpBand {
    Below6 => "<6 mg/dl",
    Below12 => "<12 mg/dl",
});

str_enum!(
    /// Editable patient fields, in form order.
    PatientField {
        Name => "name",
        Age => "age",
        Gender => "gender",
        PatientId => "patient_id",
    }
);

impl RhFactor {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Positive => "+",
            Self::Negative => "-",
        }
    }
}

impl Default for FormMode {
    fn default() -> Self {
        Self::Multiple
    }
}

impl PatientField {
    /// Label used in form prompts and gate messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "Patient Name",
            Self::Age => "Age",
            Self::Gender => "Gender",
            Self::PatientId => "Patient ID",
        }
    }
}
