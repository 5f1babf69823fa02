use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Routing bucket a queue maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    TechnicalSupport,
    Accounting,
    Sales,
}

impl Department {
    pub const ALL: [Department; 3] = [
        Department::TechnicalSupport,
        Department::Accounting,
        Department::Sales,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::TechnicalSupport => "technical_support",
            Department::Accounting => "accounting",
            Department::Sales => "sales",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Department::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| format!("unknown department '{s}'"))
    }
}

/// Queue label to department; queues not listed go to sales
pub const DEPARTMENT_TABLE: &[(&str, Department)] = &[
    ("Technical Support", Department::TechnicalSupport),
    ("IT Support", Department::TechnicalSupport),
    ("Product Support", Department::TechnicalSupport),
    ("Billing and Payments", Department::Accounting),
    ("Returns and Exchanges", Department::Accounting),
    ("Sales and Pre-Sales", Department::Sales),
    ("Customer Service", Department::Sales),
    ("General Inquiry", Department::Sales),
];

pub fn department_for(queue: &str) -> Department {
    DEPARTMENT_TABLE
        .iter()
        .find(|(label, _)| *label == queue)
        .map(|(_, department)| *department)
        .unwrap_or(Department::Sales)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_queues() {
        assert_eq!(
            department_for("Technical Support"),
            Department::TechnicalSupport
        );
        assert_eq!(department_for("IT Support"), Department::TechnicalSupport);
        assert_eq!(
            department_for("Product Support"),
            Department::TechnicalSupport
        );
        assert_eq!(department_for("Billing and Payments"), Department::Accounting);
        assert_eq!(
            department_for("Returns and Exchanges"),
            Department::Accounting
        );
        assert_eq!(department_for("Sales and Pre-Sales"), Department::Sales);
        assert_eq!(department_for("Customer Service"), Department::Sales);
        assert_eq!(department_for("General Inquiry"), Department::Sales);
    }

    #[test]
    fn test_unmapped_queues_fall_back_to_sales() {
        assert_eq!(department_for("Human Resources"), Department::Sales);
        assert_eq!(
            department_for("Service Outages and Maintenance"),
            Department::Sales
        );
        assert_eq!(department_for("technical support"), Department::Sales);
    }

    #[test]
    fn test_department_string_round_trip() {
        for department in Department::ALL {
            assert_eq!(department.as_str().parse::<Department>(), Ok(department));
        }
        assert!("admin".parse::<Department>().is_err());
    }

    #[test]
    fn test_department_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Department::TechnicalSupport).unwrap(),
            "\"technical_support\""
        );
    }

    proptest! {
        #[test]
        fn any_queue_routes_to_a_known_department(queue in ".*") {
            prop_assert!(Department::ALL.contains(&department_for(&queue)));
        }
    }
}
