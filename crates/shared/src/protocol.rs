use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{calendar_date, CandidateId, ElectorId};

/// Body of `POST /electors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateElectorRequest {
    #[serde(rename = "nom")]
    pub last_name: String,
    #[serde(rename = "prenom")]
    pub first_name: String,
    #[serde(rename = "dateNaissance", with = "calendar_date")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(rename = "identifiantSecurise")]
    pub secure_identifier: String,
}

/// Body of `POST /votes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVoteRequest {
    pub elector_id: ElectorId,
    pub candidate_id: CandidateId,
}
