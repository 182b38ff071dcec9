use serde::Serialize;

/// A habitat variable measured at each station visit.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub struct HabitatVariable {
    /// Column key used in the habitat table (`habvar`)
    pub key: &'static str,
    /// Human-readable label used for axes and dropdowns
    pub label: &'static str,
}

/// Every variable the reports know how to present.
pub static CATALOG: [HabitatVariable; 9] = [
    HabitatVariable {
        key: "StnCanopy",
        label: "Canopy cover (%)",
    },
    HabitatVariable {
        key: "StnDecCan",
        label: "Deciduous canopy (%)",
    },
    HabitatVariable {
        key: "StnAvgDepth",
        label: "Average depth (ft)",
    },
    HabitatVariable {
        key: "StnMaxDepth",
        label: "Max depth (ft)",
    },
    HabitatVariable {
        key: "StnEmbed",
        label: "Embeddedness (%)",
    },
    HabitatVariable {
        key: "StnEscCovRat",
        label: "Escape cover ratio",
    },
    HabitatVariable {
        key: "StnFines",
        label: "Fines (%)",
    },
    HabitatVariable {
        key: "StnLength",
        label: "Station length (ft)",
    },
    HabitatVariable {
        key: "StnWidth",
        label: "Station width (ft)",
    },
];

impl HabitatVariable {
    pub fn lookup(key: &str) -> Option<&'static HabitatVariable> {
        CATALOG.iter().find(|v| v.key.eq_ignore_ascii_case(key))
    }

    /// Label for a key, falling back to the key itself for variables
    /// outside the catalog.
    pub fn label_for(key: &str) -> String {
        match HabitatVariable::lookup(key) {
            Some(v) => v.label.to_string(),
            None => key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::HabitatVariable;

    #[test]
    fn test_lookup() {
        let fines = HabitatVariable::lookup("stnfines").unwrap();
        assert_eq!(fines.key, "StnFines");
        assert_eq!(fines.label, "Fines (%)");
        assert!(HabitatVariable::lookup("Temperature").is_none());
    }

    #[test]
    fn test_label_fallback() {
        assert_eq!(HabitatVariable::label_for("StnWidth"), "Station width (ft)");
        assert_eq!(HabitatVariable::label_for("Conductivity"), "Conductivity");
    }
}
