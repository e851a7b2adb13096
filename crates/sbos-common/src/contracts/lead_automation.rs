use serde::{Deserialize, Serialize};

use super::{Contract, ContractViolation, ensure, ensure_count, ensure_text};
use crate::task::TaskKind;

/// Number of touches in a follow-up sequence.
pub const TOUCH_COUNT: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
    Phone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Touch {
    pub day: u32,
    pub channel: Channel,
    /// Touch purpose tag, e.g. `welcome`, `nudge` or `breakup`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub body: String,
    pub purpose: String,
}

/// Display-ready metric ranges such as `"45-55%"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedMetrics {
    pub open_rate: String,
    pub reply_rate: String,
    pub conversion_rate: String,
}

/// A multi-touch lead nurturing sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSequence {
    pub sequence_name: String,
    pub total_duration: String,
    pub touches: Vec<Touch>,
    pub expected_metrics: ExpectedMetrics,
}

impl Contract for LeadSequence {
    const TASK: TaskKind = TaskKind::LeadAutomation;

    fn check(&self) -> Result<(), ContractViolation> {
        ensure_count(Self::TASK, "touches", &self.touches, TOUCH_COUNT)
    }

    fn lint(&self) -> Vec<ContractViolation> {
        let task = Self::TASK;
        let mut lints = Vec::new();
        lints.extend(ensure_text(task, "sequenceName", &self.sequence_name).err());
        for (i, touch) in self.touches.iter().enumerate() {
            lints.extend(ensure_text(task, format!("touches[{}].body", i), &touch.body).err());
        }
        for (i, pair) in self.touches.windows(2).enumerate() {
            lints.extend(
                ensure(
                    pair[1].day >= pair[0].day,
                    task,
                    format!("touches[{}].day", i + 1),
                    format!("should not precede day {}, found {}", pair[0].day, pair[1].day),
                )
                .err(),
            );
        }
        lints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn valid_sequence() -> Value {
        let touches: Vec<Value> = [
            (0, "email", "welcome"),
            (1, "sms", "value"),
            (3, "email", "nudge"),
            (7, "phone", "case-study"),
            (10, "email", "direct-ask"),
            (14, "sms", "last-chance"),
            (21, "email", "breakup"),
        ]
        .iter()
        .map(|(day, channel, kind)| {
            json!({
                "day": day,
                "channel": channel,
                "type": kind,
                "subject": "Quick question, {{name}}",
                "body": "Hi {{name}}, following up from {{company}}.",
                "purpose": "Keep the conversation going"
            })
        })
        .collect();

        json!({
            "sequenceName": "New Lead Nurture",
            "totalDuration": "21 days",
            "touches": touches,
            "expectedMetrics": {"openRate": "45-55%", "replyRate": "15-22%", "conversionRate": "8-12%"}
        })
    }

    #[test]
    fn test_valid_sequence_decodes() {
        let sequence = LeadSequence::decode(&valid_sequence()).unwrap();
        assert_eq!(sequence.touches.len(), 7);
        assert_eq!(sequence.touches[3].channel, Channel::Phone);
        assert_eq!(sequence.touches[6].kind, "breakup");
        assert_eq!(sequence.expected_metrics.reply_rate, "15-22%");
    }

    #[test]
    fn test_sms_touch_without_subject_is_fine() {
        let mut value = valid_sequence();
        value["touches"][1].as_object_mut().unwrap().remove("subject");
        let sequence = LeadSequence::decode(&value).unwrap();
        assert!(sequence.touches[1].subject.is_none());
    }

    #[test]
    fn test_requires_seven_touches() {
        let mut value = valid_sequence();
        value["touches"].as_array_mut().unwrap().truncate(5);
        let err = LeadSequence::decode(&value).unwrap_err();
        assert!(err.to_string().contains("exactly 7 entries, found 5"));
    }

    #[test]
    fn test_unknown_channel_is_rejected() {
        let mut value = valid_sequence();
        value["touches"][0]["channel"] = json!("carrier-pigeon");
        assert!(matches!(
            LeadSequence::decode(&value),
            Err(ContractViolation::Shape { .. })
        ));
    }

    #[test]
    fn test_days_going_backwards_are_linted() {
        let mut value = valid_sequence();
        value["touches"][4]["day"] = json!(2);
        let sequence = LeadSequence::decode(&value).unwrap();
        let lints = sequence.lint();
        assert_eq!(lints.len(), 1);
        assert!(lints[0].to_string().contains("touches[4].day"));
        assert!(LeadSequence::decode(&valid_sequence()).unwrap().lint().is_empty());
    }

    #[test]
    fn test_missing_expected_metrics_is_rejected() {
        let mut value = valid_sequence();
        value.as_object_mut().unwrap().remove("expectedMetrics");
        assert!(LeadSequence::decode(&value).is_err());
    }
}
