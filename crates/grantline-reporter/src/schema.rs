//! Wire types for the RePORTER project search endpoint
//!
//! Responses are decoded in two steps: serde parses the body into raw
//! structs (every field required, nullable ones included), then
//! [`AwardRecord::try_from`] checks formats and flattens the nested
//! organization into the record.

use serde::{Deserialize, Deserializer, Serialize};

use crate::plan::PageRequest;

/// Sort order requested from the API; stable paging depends on it
pub const SORT_FIELD: &str = "project_start_date";

// =============================================================================
// Request
// =============================================================================

/// POST body for `/v2/projects/search`
#[derive(Debug, Serialize)]
pub struct SearchRequest {
    pub criteria: Criteria,
    pub offset: u64,
    pub limit: u32,
    pub sort_field: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Criteria {
    pub project_end_date: DateRange,
    pub org_states: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct DateRange {
    pub from_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_date: Option<String>,
}

impl From<&PageRequest> for SearchRequest {
    fn from(request: &PageRequest) -> Self {
        let chunk = request.criteria.chunk;
        Self {
            criteria: Criteria {
                project_end_date: DateRange {
                    from_date: chunk.from_date(),
                    to_date: chunk.to_date(),
                },
                org_states: vec![request.criteria.state],
            },
            offset: request.offset,
            limit: request.limit,
            sort_field: SORT_FIELD,
        }
    }
}

// =============================================================================
// Response
// =============================================================================

/// Nullable but required: `null` is fine, a missing key is not.
///
/// Plain `Option` fields default to `None` when absent; routing them
/// through `deserialize_with` makes serde report the missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchMeta {
    pub search_id: String,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
    pub sort_field: String,
}

#[derive(Debug, Deserialize)]
struct RawSearchResponse {
    meta: SearchMeta,
    results: Vec<RawAward>,
}

#[derive(Debug, Deserialize)]
struct RawOrganization {
    #[serde(deserialize_with = "nullable")]
    org_name: Option<String>,
    #[serde(deserialize_with = "nullable")]
    org_city: Option<String>,
    #[serde(deserialize_with = "nullable")]
    org_state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAward {
    appl_id: u64,
    fiscal_year: i32,
    project_num: String,
    #[serde(deserialize_with = "nullable")]
    award_amount: Option<serde_json::Number>,
    is_active: bool,
    #[serde(deserialize_with = "nullable")]
    contact_pi_name: Option<String>,
    #[serde(deserialize_with = "nullable")]
    budget_start: Option<String>,
    #[serde(deserialize_with = "nullable")]
    budget_end: Option<String>,
    project_title: String,
    project_detail_url: String,
    #[serde(deserialize_with = "nullable")]
    project_start_date: Option<String>,
    project_end_date: String,
    date_added: String,
    organization: RawOrganization,
    #[serde(deserialize_with = "nullable")]
    terms: Option<String>,
    #[serde(deserialize_with = "nullable")]
    abstract_text: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pref_terms: Option<String>,
}

/// One grant award as written to disk, organization fields flattened.
///
/// Field order is the on-disk key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwardRecord {
    pub appl_id: u64,
    pub fiscal_year: i32,
    pub project_num: String,
    pub award_amount: Option<serde_json::Number>,
    pub is_active: bool,
    pub contact_pi_name: Option<String>,
    pub budget_start: Option<String>,
    pub budget_end: Option<String>,
    pub project_title: String,
    pub project_detail_url: String,
    pub project_start_date: Option<String>,
    pub project_end_date: String,
    pub date_added: String,
    pub terms: Option<String>,
    pub abstract_text: Option<String>,
    pub pref_terms: Option<String>,
    pub org_name: Option<String>,
    pub org_city: Option<String>,
    pub org_state: Option<String>,
}

/// A decoded, validated search response
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub meta: SearchMeta,
    pub records: Vec<AwardRecord>,
}

/// Why a response body was rejected
#[derive(Debug)]
pub enum DecodeError {
    /// Body is not JSON or does not have the expected shape
    Json(serde_json::Error),
    /// Shape is right but a value has the wrong format
    Invalid {
        index: usize,
        field: &'static str,
        reason: String,
    },
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(e) => write!(f, "malformed response: {e}"),
            Self::Invalid {
                index,
                field,
                reason,
            } => write!(f, "results[{index}].{field}: {reason}"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::Invalid { .. } => None,
        }
    }
}

/// Field name and reason for a format violation
type FieldError = (&'static str, String);

/// UTC timestamp `YYYY-MM-DDTHH:MM:SS[.fff]Z`; offsets, lowercase
/// separators and leap seconds are rejected.
fn check_datetime(field: &'static str, value: &str) -> Result<(), FieldError> {
    let bytes = value.as_bytes();
    let utc_shape = bytes.len() >= 20
        && bytes[10] == b'T'
        && bytes.ends_with(b"Z")
        && (bytes.len() == 20 || bytes[19] == b'.')
        && bytes[17] <= b'5';
    if !utc_shape {
        return Err((
            field,
            format!("invalid datetime {value:?}: expected a UTC timestamp ending in Z"),
        ));
    }
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|_| ())
        .map_err(|e| (field, format!("invalid datetime {value:?}: {e}")))
}

fn check_optional_datetime(field: &'static str, value: Option<&str>) -> Result<(), FieldError> {
    value.map_or(Ok(()), |v| check_datetime(field, v))
}

fn check_url(field: &'static str, value: &str) -> Result<(), FieldError> {
    reqwest::Url::parse(value)
        .map(|_| ())
        .map_err(|e| (field, format!("invalid url {value:?}: {e}")))
}

impl TryFrom<RawAward> for AwardRecord {
    type Error = FieldError;

    fn try_from(raw: RawAward) -> Result<Self, Self::Error> {
        check_optional_datetime("budget_start", raw.budget_start.as_deref())?;
        check_optional_datetime("budget_end", raw.budget_end.as_deref())?;
        check_url("project_detail_url", &raw.project_detail_url)?;
        check_optional_datetime("project_start_date", raw.project_start_date.as_deref())?;
        check_datetime("project_end_date", &raw.project_end_date)?;
        check_datetime("date_added", &raw.date_added)?;

        Ok(Self {
            appl_id: raw.appl_id,
            fiscal_year: raw.fiscal_year,
            project_num: raw.project_num,
            award_amount: raw.award_amount,
            is_active: raw.is_active,
            contact_pi_name: raw.contact_pi_name,
            budget_start: raw.budget_start,
            budget_end: raw.budget_end,
            project_title: raw.project_title,
            project_detail_url: raw.project_detail_url,
            project_start_date: raw.project_start_date,
            project_end_date: raw.project_end_date,
            date_added: raw.date_added,
            terms: raw.terms,
            abstract_text: raw.abstract_text,
            pref_terms: raw.pref_terms,
            org_name: raw.organization.org_name,
            org_city: raw.organization.org_city,
            org_state: raw.organization.org_state,
        })
    }
}

/// Decode a search response body; any bad record rejects the whole page.
pub fn decode_response(body: &[u8]) -> Result<SearchPage, DecodeError> {
    let raw: RawSearchResponse = serde_json::from_slice(body).map_err(DecodeError::Json)?;

    let records = raw
        .results
        .into_iter()
        .enumerate()
        .map(|(index, award)| {
            AwardRecord::try_from(award).map_err(|(field, reason)| DecodeError::Invalid {
                index,
                field,
                reason,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SearchPage {
        meta: raw.meta,
        records,
    })
}
