use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters of the social preview endpoint
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PreviewQuery {
    /// Card type: `candidate` or `election`
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Candidate full name (candidate cards)
    pub full_name: Option<String>,
    /// Position the candidate runs for (candidate cards)
    pub position: Option<String>,
    /// Candidate photo URL (candidate cards)
    pub photo_url: Option<String>,
    /// Election display name (election cards)
    pub election_name: Option<String>,
    /// Formatted start date (election cards)
    pub election_start_date: Option<String>,
    /// Formatted end date (election cards)
    pub election_end_date: Option<String>,
    /// Election logo URL (election cards)
    pub election_logo_url: Option<String>,
}
