use triage_core::FaultLabel;

struct LabelRule {
    label: FaultLabel,
    keywords: &'static [&'static str],
}

// Evaluated in order; the first rule with any keyword hit wins
const RULES: &[LabelRule] = &[
    LabelRule {
        label: FaultLabel::NetworkTimeout,
        keywords: &[
            "timeout",
            "timed out",
            "gateway timeout",
            "upstream timeout",
            "retrying request",
        ],
    },
    LabelRule {
        label: FaultLabel::AuthFailure,
        keywords: &[
            "401",
            "unauthorized",
            "forbidden",
            "invalid token",
            "expired token",
            "oauth",
        ],
    },
    LabelRule {
        label: FaultLabel::DatabaseError,
        keywords: &[
            "sqlstate",
            "db",
            "postgres",
            "mysql",
            "connection refused",
            "deadlock",
        ],
    },
    LabelRule {
        label: FaultLabel::NullPointer,
        keywords: &["nullpointer", "null pointer", "npe"],
    },
    LabelRule {
        label: FaultLabel::ServiceUnavailable,
        keywords: &[
            "503",
            "service unavailable",
            "backend down",
            "dependency down",
        ],
    },
    LabelRule {
        label: FaultLabel::BadRequest,
        keywords: &["400", "bad request", "malformed", "invalid payload", "schema"],
    },
    LabelRule {
        label: FaultLabel::RateLimitExceeded,
        keywords: &["429", "rate limit", "too many requests", "throttl"],
    },
    LabelRule {
        label: FaultLabel::CacheError,
        keywords: &["redis", "memcache", "cache", "eviction"],
    },
    LabelRule {
        label: FaultLabel::ConfigurationError,
        keywords: &["config", "env var", "misconfig", "invalid setting"],
    },
];

/// Label from keyword rules alone, if any rule matches
pub fn rule_label(message: &str) -> Option<FaultLabel> {
    let lower = message.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| lower.contains(kw)))
        .map(|rule| rule.label)
}
