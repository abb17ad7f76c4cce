use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ElectorId);
id_newtype!(VoteId);
id_newtype!(CandidateId);

/// A registered voter as returned by the elector registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Elector {
    #[serde(rename = "idElector")]
    pub id: ElectorId,
    #[serde(rename = "nom")]
    pub last_name: String,
    #[serde(rename = "prenom")]
    pub first_name: String,
    #[serde(rename = "dateNaissance", with = "calendar_date", default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(rename = "identifiantSecurise")]
    pub secure_identifier: String,
    #[serde(rename = "aVote", default)]
    pub has_voted: bool,
    /// Confirmation text the registry attaches to create responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Elector {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    #[serde(rename = "idVote")]
    pub id: VoteId,
    #[serde(rename = "dateHeure", default)]
    pub cast_at: Option<NaiveDateTime>,
    #[serde(rename = "electorId")]
    pub elector_id: ElectorId,
    #[serde(rename = "candidateId")]
    pub candidate_id: CandidateId,
    #[serde(rename = "electorName", default, skip_serializing_if = "Option::is_none")]
    pub elector_name: Option<String>,
}

/// Aggregated count for one candidate, computed by the tally backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    #[serde(rename = "candidateId")]
    pub candidate_id: CandidateId,
    #[serde(rename = "totalVotes", default, deserialize_with = "null_as_zero")]
    pub total_votes: i64,
    #[serde(rename = "candidateName", default, skip_serializing_if = "Option::is_none")]
    pub candidate_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    #[serde(default)]
    pub total_votes: Option<i64>,
    #[serde(default)]
    pub total_electors: Option<i64>,
    #[serde(default)]
    pub participation_rate: Option<f64>,
    #[serde(default)]
    pub total_candidates: Option<i64>,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or_default())
}

/// Calendar dates travel as `YYYY-MM-DD`. Incoming values may also be a
/// full ISO-8601 timestamp or epoch milliseconds.
pub mod calendar_date {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d";

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Millis(i64),
    }

    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, FORMAT) {
            return Some(date);
        }
        if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
            return Some(stamp.naive_utc().date());
        }
        if let Ok(stamp) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(stamp.date());
        }
        None
    }

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Raw::Text(text)) => parse(&text)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid calendar date '{text}'"))),
            Some(Raw::Millis(millis)) => DateTime::from_timestamp_millis(millis)
                .map(|stamp| Some(stamp.date_naive()))
                .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {millis}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elector_reads_registry_field_names() {
        let elector: Elector = serde_json::from_str(
            r#"{"idElector":7,"nom":"Durand","prenom":"Alice","dateNaissance":"1990-04-12","identifiantSecurise":"SEC-7","aVote":true}"#,
        )
        .expect("decode elector");

        assert_eq!(elector.id, ElectorId(7));
        assert_eq!(elector.display_name(), "Alice Durand");
        assert_eq!(elector.date_of_birth, NaiveDate::from_ymd_opt(1990, 4, 12));
        assert!(elector.has_voted);
    }

    #[test]
    fn birth_date_accepts_timestamps_and_epoch_millis() {
        assert_eq!(
            calendar_date::parse("1990-04-12T00:00:00.000+00:00"),
            NaiveDate::from_ymd_opt(1990, 4, 12)
        );

        let elector: Elector = serde_json::from_str(
            r#"{"idElector":1,"nom":"A","prenom":"B","dateNaissance":0,"identifiantSecurise":"X"}"#,
        )
        .expect("decode elector");
        assert_eq!(elector.date_of_birth, NaiveDate::from_ymd_opt(1970, 1, 1));
        assert!(!elector.has_voted);
    }

    #[test]
    fn result_with_null_total_counts_as_zero() {
        let result: CandidateResult =
            serde_json::from_str(r#"{"candidateId":3,"totalVotes":null}"#).expect("decode");
        assert_eq!(result.total_votes, 0);
    }

    #[test]
    fn statistics_tolerates_partial_payloads() {
        let stats: Statistics =
            serde_json::from_str(r#"{"totalVotes":4,"totalCandidates":2,"results":[]}"#)
                .expect("decode statistics");
        assert_eq!(stats.total_votes, Some(4));
        assert_eq!(stats.participation_rate, None);
    }
}
