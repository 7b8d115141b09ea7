use serde::{Deserialize, Serialize};

/// Member entry as the registration endpoint expects it. Team submissions
/// never carry per-member competence; individual submissions send a
/// single-element list with the competence statement merged in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberEntry {
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competence: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationPayload {
    pub is_team: bool,
    /// Empty for individual submissions.
    pub team_name: String,
    /// Empty for individual submissions.
    pub leader_phone: String,
    pub idea_description: String,
    pub competence: String,
    pub request_add_member: bool,
    pub members: Vec<MemberEntry>,
}

/// Outer body of `POST /registrations` and of the best-effort
/// notification endpoint, which accepts the identical shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationEnvelope {
    pub registration: RegistrationPayload,
}

/// A `message` field signals acceptance; `errors` carries the server's
/// rejection text. The status line is not authoritative for this endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactResponse {
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team_envelope() -> RegistrationEnvelope {
        RegistrationEnvelope {
            registration: RegistrationPayload {
                is_team: true,
                team_name: "Null Terminators".into(),
                leader_phone: "+4712345678".into(),
                idea_description: "triage assistant".into(),
                competence: String::new(),
                request_add_member: true,
                members: vec![
                    MemberEntry {
                        name: "Ada".into(),
                        email: "ada@example.com".into(),
                        role: "IT".into(),
                        competence: None,
                    },
                    MemberEntry {
                        name: "Elsa".into(),
                        email: "elsa@example.com".into(),
                        role: "Medical".into(),
                        competence: None,
                    },
                ],
            },
        }
    }

    fn individual_envelope() -> RegistrationEnvelope {
        RegistrationEnvelope {
            registration: RegistrationPayload {
                is_team: false,
                team_name: String::new(),
                leader_phone: String::new(),
                idea_description: String::new(),
                competence: "backend development".into(),
                request_add_member: false,
                members: vec![MemberEntry {
                    name: "Ada".into(),
                    email: "ada@example.com".into(),
                    role: "IT".into(),
                    competence: Some("backend development".into()),
                }],
            },
        }
    }

    #[test]
    fn team_envelope_round_trips_losslessly() {
        let envelope = team_envelope();
        let json = serde_json::to_string(&envelope).expect("serialize");
        let parsed: RegistrationEnvelope = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed, envelope);
        assert!(json.contains("\"is_team\":true"));
        // team members never carry a competence key
        assert!(!json.contains("\"competence\":null"));
    }

    #[test]
    fn individual_envelope_round_trips_losslessly() {
        let envelope = individual_envelope();
        let json = serde_json::to_string(&envelope).expect("serialize");
        let parsed: RegistrationEnvelope = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed, envelope);
        assert_eq!(parsed.registration.members.len(), 1);
        assert_eq!(
            parsed.registration.members[0].competence.as_deref(),
            Some("backend development")
        );
    }

    #[test]
    fn registration_response_tolerates_missing_fields() {
        let accepted: RegistrationResponse =
            serde_json::from_str("{\"message\":\"ok\"}").expect("parse");
        assert_eq!(accepted.message.as_deref(), Some("ok"));
        assert!(accepted.errors.is_none());

        let rejected: RegistrationResponse =
            serde_json::from_str("{\"errors\":\"email taken\"}").expect("parse");
        assert!(rejected.message.is_none());
        assert_eq!(rejected.errors.as_deref(), Some("email taken"));

        let empty: RegistrationResponse = serde_json::from_str("{}").expect("parse");
        assert!(empty.message.is_none() && empty.errors.is_none());
    }
}
