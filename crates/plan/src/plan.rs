// Cast plan construction, editing and serialization

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cast::{CastSpec, CastType};
use crate::PlanError;

/// Multipart field prefix for a directive: `cast-col-<header>`.
pub const DIRECTIVE_PREFIX: &str = "cast-col-";

/// One serialized column instruction sent with the upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub column: String,
    pub value: String,
}

impl Directive {
    /// Multipart field name carrying this directive.
    pub fn field_name(&self) -> String {
        format!("{}{}", DIRECTIVE_PREFIX, self.column)
    }
}

/// Per-column cast plan.
///
/// Entries live in a map keyed by header; iteration always follows header
/// order, never map order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "PlanFile", try_from = "PlanFile")]
pub struct CastPlan {
    headers: Vec<String>,
    entries: HashMap<String, CastSpec>,
}

impl CastPlan {
    /// A `default` entry for every header. Repeated header names collapse
    /// into a single entry at the first position.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut plan = Self {
            headers: Vec::new(),
            entries: HashMap::new(),
        };
        for header in headers {
            let header = header.into();
            if !plan.entries.contains_key(&header) {
                plan.entries.insert(header.clone(), CastSpec::Default);
                plan.headers.push(header);
            }
        }
        plan
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn get(&self, header: &str) -> Option<&CastSpec> {
        self.entries.get(header)
    }

    /// Entries in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CastSpec)> + '_ {
        self.headers
            .iter()
            .filter_map(|h| self.entries.get(h).map(|spec| (h.as_str(), spec)))
    }

    /// Replace a column's type. Any prior option is dropped.
    pub fn set_type(&mut self, header: &str, cast_type: CastType) -> Result<(), PlanError> {
        let entry = self.entry_mut(header)?;
        *entry = CastSpec::of(cast_type);
        Ok(())
    }

    /// Set (or clear) the refinement of a column, keeping its type.
    pub fn set_option(&mut self, header: &str, value: &str) -> Result<(), PlanError> {
        let entry = self.entry_mut(header)?;
        *entry = entry.with_option(value)?;
        Ok(())
    }

    /// Apply a `COLUMN=TYPE[:OPTION]` assignment.
    pub fn apply(&mut self, assignment: &Assignment) -> Result<(), PlanError> {
        self.set_type(&assignment.column, assignment.cast_type)?;
        if let Some(option) = &assignment.option {
            self.set_option(&assignment.column, option)?;
        }
        Ok(())
    }

    /// Copy entries from `other` for headers this plan knows.
    /// Returns the columns of `other` that were not found here.
    pub fn merge(&mut self, other: &CastPlan) -> Vec<String> {
        let mut unknown = Vec::new();
        for (header, spec) in other.iter() {
            match self.entries.get_mut(header) {
                Some(entry) => *entry = spec.clone(),
                None => unknown.push(header.to_string()),
            }
        }
        unknown
    }

    /// Upload directives, one per non-default column, in header order.
    pub fn directives(&self) -> Vec<Directive> {
        self.iter()
            .filter_map(|(header, spec)| {
                spec.directive_value().map(|value| Directive {
                    column: header.to_string(),
                    value,
                })
            })
            .collect()
    }

    pub fn to_json(&self) -> Result<String, PlanError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PlanError> {
        Ok(serde_json::from_str(json)?)
    }

    fn entry_mut(&mut self, header: &str) -> Result<&mut CastSpec, PlanError> {
        self.entries
            .get_mut(header)
            .ok_or_else(|| PlanError::UnknownHeader(header.to_string()))
    }
}

/// One column of a saved plan: `{"column", "type", "option"?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCast {
    pub column: String,
    #[serde(rename = "type")]
    pub cast_type: CastType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct PlanFile {
    columns: Vec<ColumnCast>,
}

impl From<CastPlan> for PlanFile {
    fn from(plan: CastPlan) -> Self {
        let columns = plan
            .iter()
            .map(|(column, spec)| ColumnCast {
                column: column.to_string(),
                cast_type: spec.cast_type(),
                option: spec.option().map(str::to_string),
            })
            .collect();
        PlanFile { columns }
    }
}

impl TryFrom<PlanFile> for CastPlan {
    type Error = PlanError;

    fn try_from(file: PlanFile) -> Result<Self, Self::Error> {
        let mut plan = CastPlan::new(file.columns.iter().map(|c| c.column.clone()));
        for col in &file.columns {
            plan.apply(&Assignment {
                column: col.column.clone(),
                cast_type: col.cast_type,
                option: col.option.clone(),
            })?;
        }
        Ok(plan)
    }
}

/// A parsed `COLUMN=TYPE[:OPTION]` edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub column: String,
    pub cast_type: CastType,
    pub option: Option<String>,
}

impl FromStr for Assignment {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (column, rhs) = s
            .split_once('=')
            .ok_or_else(|| PlanError::InvalidAssignment(s.to_string()))?;
        if column.is_empty() || rhs.is_empty() {
            return Err(PlanError::InvalidAssignment(s.to_string()));
        }
        // Datetime formats may contain ':' so only the first one splits
        let (ty, option) = match rhs.split_once(':') {
            Some((ty, option)) => (ty, Some(option.to_string())),
            None => (rhs, None),
        };
        Ok(Assignment {
            column: column.to_string(),
            cast_type: ty.parse()?,
            option,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cast::IntWidth;

    #[test]
    fn test_new_plan_is_all_default() {
        let plan = CastPlan::new(["id", "name", "joined"]);
        assert_eq!(plan.len(), 3);
        for (_, spec) in plan.iter() {
            assert_eq!(spec, &CastSpec::Default);
            assert_eq!(spec.option(), None);
        }
        assert!(plan.directives().is_empty());
    }

    #[test]
    fn test_iteration_follows_header_order() {
        let headers = ["z", "a", "m", "b", "y"];
        let plan = CastPlan::new(headers);
        let order: Vec<_> = plan.iter().map(|(h, _)| h).collect();
        assert_eq!(order, headers);
    }

    #[test]
    fn test_duplicate_headers_collapse() {
        let plan = CastPlan::new(["a", "b", "a"]);
        assert_eq!(plan.headers(), ["a", "b"]);
    }

    #[test]
    fn test_set_type_clears_option_for_every_transition() {
        for from in CastType::ALL {
            for to in CastType::ALL {
                let mut plan = CastPlan::new(["c"]);
                plan.set_type("c", from).unwrap();
                let option = match from {
                    CastType::Uint => Some("uint16"),
                    CastType::Int => Some("int8"),
                    CastType::Float => Some("float32"),
                    CastType::Datetime => Some("%d/%m/%Y"),
                    _ => None,
                };
                if let Some(option) = option {
                    plan.set_option("c", option).unwrap();
                    assert!(plan.get("c").unwrap().option().is_some());
                }
                plan.set_type("c", to).unwrap();
                assert_eq!(plan.get("c").unwrap().option(), None, "{from} -> {to}");
                assert_eq!(plan.get("c").unwrap().cast_type(), to);
            }
        }
    }

    #[test]
    fn test_unknown_header() {
        let mut plan = CastPlan::new(["a"]);
        assert!(matches!(
            plan.set_type("nope", CastType::Int),
            Err(PlanError::UnknownHeader(_))
        ));
    }

    #[test]
    fn test_directives_skip_defaults() {
        let mut plan = CastPlan::new(["A", "B", "C", "D"]);
        plan.set_type("A", CastType::Int).unwrap();
        plan.set_option("A", "int32").unwrap();
        plan.set_type("C", CastType::Datetime).unwrap();
        plan.set_option("C", "%Y").unwrap();
        plan.set_type("D", CastType::Datetime).unwrap();

        let directives = plan.directives();
        assert_eq!(directives.len(), 3);
        assert_eq!(directives[0], Directive { column: "A".into(), value: "int32".into() });
        assert_eq!(directives[1].value, "datetime(%Y)");
        assert_eq!(directives[2].value, "datetime");
        assert_eq!(directives[0].field_name(), "cast-col-A");
    }

    #[test]
    fn test_parse_assignment() {
        let a: Assignment = "when=datetime:%H:%M".parse().unwrap();
        assert_eq!(a.column, "when");
        assert_eq!(a.cast_type, CastType::Datetime);
        assert_eq!(a.option.as_deref(), Some("%H:%M"));

        let a: Assignment = "n=uint".parse().unwrap();
        assert_eq!(a.option, None);

        assert!("n".parse::<Assignment>().is_err());
        assert!("=int".parse::<Assignment>().is_err());
        assert!(matches!("n=bigint".parse::<Assignment>(), Err(PlanError::UnknownType(_))));
    }

    #[test]
    fn test_apply_rejects_option_on_text() {
        let mut plan = CastPlan::new(["n"]);
        let a: Assignment = "n=object:utf8".parse().unwrap();
        assert!(matches!(plan.apply(&a), Err(PlanError::OptionNotSupported(CastType::Object))));
    }

    #[test]
    fn test_json_keeps_header_order_and_options() {
        let mut plan = CastPlan::new(["b", "a"]);
        plan.set_type("a", CastType::Int).unwrap();
        plan.set_option("a", "int64").unwrap();

        let json = plan.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["columns"][0]["column"], "b");
        assert_eq!(value["columns"][0]["type"], "default");
        assert!(value["columns"][0].get("option").is_none());
        assert_eq!(value["columns"][1]["option"], "int64");

        let loaded = CastPlan::from_json(&json).unwrap();
        assert_eq!(loaded, plan);
        assert_eq!(loaded.get("a"), Some(&CastSpec::Int(Some(IntWidth::Int64))));
    }

    #[test]
    fn test_json_rejects_invalid_combination() {
        let json = r#"{"columns":[{"column":"x","type":"category","option":"int8"}]}"#;
        assert!(CastPlan::from_json(json).is_err());
    }

    #[test]
    fn test_merge_reports_unknown_columns() {
        let mut plan = CastPlan::new(["a", "b"]);
        let mut saved = CastPlan::new(["b", "gone"]);
        saved.set_type("b", CastType::Float).unwrap();
        saved.set_type("gone", CastType::Int).unwrap();

        let unknown = plan.merge(&saved);
        assert_eq!(unknown, vec!["gone"]);
        assert_eq!(plan.get("b"), Some(&CastSpec::Float(None)));
        assert_eq!(plan.get("a"), Some(&CastSpec::Default));
    }
}
