use std::str::FromStr;

use serde::Serialize;

use super::models::JobStatus;

/// Columns the backend accepts for `sort_by`
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Title,
    Company,
    Location,
    Status,
    AppliedDate,
    FollowUpDate,
    CreatedAt,
    UpdatedAt,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(SortField::Title),
            "company" => Ok(SortField::Company),
            "location" => Ok(SortField::Location),
            "status" => Ok(SortField::Status),
            "applied_date" => Ok(SortField::AppliedDate),
            "follow_up_date" => Ok(SortField::FollowUpDate),
            "created_at" => Ok(SortField::CreatedAt),
            "updated_at" => Ok(SortField::UpdatedAt),
            other => Err(format!("Invalid sort field: {}", other)),
        }
    }
}

/// Query parameters for `GET /jobs/search`
///
/// Unset filters are left off the query string so the backend defaults apply
/// (`skip=0`, `limit=100`, `sort_by=applied_date`, `sort_desc=true`).
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SearchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_desc: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_filters_are_not_serialized() {
        let filters = SearchFilters {
            company: Some("Acme".into()),
            sort_by: Some(SortField::AppliedDate),
            sort_desc: Some(false),
            ..Default::default()
        };
        let body = serde_json::to_value(&filters).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"company": "Acme", "sort_by": "applied_date", "sort_desc": false})
        );
    }

    #[test]
    fn sort_field_rejects_unknown_columns() {
        assert_eq!("Follow_Up_Date".parse::<SortField>(), Ok(SortField::FollowUpDate));
        assert!("salary".parse::<SortField>().is_err());
    }
}
