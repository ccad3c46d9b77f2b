//! Deterministic, offline extraction of hiring requirements from one raw
//! message. Rules are table-driven so the rule set itself is testable data;
//! the control flow only walks the tables. Never fails — an unmatched message
//! yields an empty partial record.

use intake_protocol::{BudgetRange, HiringNeeds, RequirementRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Ordered industry keyword rules; first match wins.
const INDUSTRY_RULES: &[(&str, &str)] = &[
    (r"\bfintech\b", "fintech"),
    (r"\bedtech\b", "edtech"),
    (r"\bhealthtech\b", "healthtech"),
    (r"\bsaas\b", "saas"),
    (r"\be-?commerce\b", "ecommerce"),
    (r"\blogistics\b", "logistics"),
];

/// Role phrase rules: pattern over a lowercased phrase, canonical title.
/// Doubles as the synonym normalizer for counted segments and as the
/// dictionary scanned against the whole message. Plural forms accepted.
const ROLE_RULES: &[(&str, &str)] = &[
    (
        r"\bback[\s-]?end(?:\s+(?:dev|developer|engineer))?s?\b",
        "backend engineer",
    ),
    (
        r"\bfront[\s-]?end(?:\s+(?:dev|developer|engineer))?s?\b",
        "frontend engineer",
    ),
    (
        r"\bfull[\s-]?stack(?:\s+(?:dev|developer|engineer))?s?\b",
        "full stack engineer",
    ),
    (
        r"\b(?:ui\s*/\s*ux|ux\s*/\s*ui|product\s+designer|ui\s+designer|ux\s+designer)s?\b",
        "ui/ux designer",
    ),
    (r"\bsoftware\s+engineers?\b", "software engineer"),
    (r"\bmarketing\b", "marketing"),
    (r"\bsales\b", "sales"),
    (r"\bhr\b", "hr"),
    (r"\bproduct\s+managers?\b", "product manager"),
    (r"\bdata\s+scientists?\b", "data scientist"),
];

static INDUSTRY_RES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    INDUSTRY_RULES
        .iter()
        .map(|(pat, name)| (Regex::new(pat).expect("industry rule"), *name))
        .collect()
});

static ROLE_RES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    ROLE_RULES
        .iter()
        .map(|(pat, name)| (Regex::new(pat).expect("role rule"), *name))
        .collect()
});

static RE_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,;.!?]|\band\b").expect("segment"));
static RE_COUNTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,3})\s*(?:x\s+)?([a-z][a-z/\- ]*)").expect("counted"));
static RE_GENERIC_COUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,3})\s*(?:people|hires?|roles?|positions?|openings?)\b").expect("count")
});
static RE_LOCATION_IN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bin\s+([a-z][a-z ]*?)(?:,?\s*india)?\s*(?:[.!?,]|$)").expect("location")
});
static RE_LOCATION_CITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(mumbai|delhi|bengaluru|bangalore|pune|hyderabad|chennai|gurgaon|gurugram|noida)\b")
        .expect("city")
});
static RE_URGENCY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:asap|urgent|immediate|right away)\b").expect("urgency"));
static RE_TIMELINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,3})\s*(days?|weeks?|months?)\b").expect("timeline"));
static RE_BUDGET_LAKH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d+(?:\.\d+)?)\s*lakhs?\b").expect("lakh"));
static RE_BUDGET_RUPEE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,3}(?:[,\d]{3})+|\d+)\s*(?:rs\.?|rupees?|inr)\b").expect("rupee")
});

/// Map a free phrase to a canonical role title, if any rule matches.
fn canonical_role(phrase: &str) -> Option<&'static str> {
    ROLE_RES
        .iter()
        .find(|(re, _)| re.is_match(phrase))
        .map(|(_, name)| *name)
}

fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn detect_industry(text: &str) -> Option<String> {
    INDUSTRY_RES
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, name)| name.to_string())
}

/// Counted "`<N> <role-phrase>`" segments plus a dictionary scan; duplicates
/// collapsed, counted roles first in match order.
fn detect_roles(text: &str) -> (Vec<String>, u32) {
    let mut counts: HashMap<&'static str, u32> = HashMap::new();
    let mut roles: Vec<String> = Vec::new();

    for segment in RE_SEGMENT.split(text) {
        let Some(caps) = RE_COUNTED.captures(segment) else {
            continue;
        };
        let n: u32 = match caps[1].parse() {
            Ok(0) | Err(_) => continue,
            Ok(n) => n,
        };
        if let Some(role) = canonical_role(&caps[2]) {
            *counts.entry(role).or_insert(0) += n;
            if !roles.iter().any(|r| r == role) {
                roles.push(role.to_string());
            }
        }
    }

    for (re, role) in ROLE_RES.iter() {
        if re.is_match(text) && !roles.iter().any(|r| r == role) {
            roles.push(role.to_string());
        }
    }

    (roles, counts.values().sum())
}

fn detect_count(text: &str, counted_total: u32, roles: &[String]) -> Option<u32> {
    if counted_total > 0 {
        return Some(counted_total);
    }
    if let Some(caps) = RE_GENERIC_COUNT.captures(text) {
        if let Ok(n) = caps[1].parse::<u32>() {
            if n > 0 {
                return Some(n);
            }
        }
    }
    if !roles.is_empty() {
        return Some(roles.len() as u32);
    }
    None
}

fn detect_location(text: &str) -> Option<String> {
    if let Some(caps) = RE_LOCATION_IN.captures(text) {
        let raw = caps[1].trim();
        if !raw.is_empty() {
            return Some(title_case(raw));
        }
    }
    RE_LOCATION_CITY
        .captures(text)
        .map(|caps| title_case(&caps[1]))
}

fn detect_timeline(text: &str) -> Option<String> {
    RE_TIMELINE
        .captures(text)
        .map(|caps| format!("{} {}", &caps[1], &caps[2]))
}

fn detect_budget(text: &str) -> Option<BudgetRange> {
    if let Some(caps) = RE_BUDGET_LAKH.captures(text) {
        let n: f64 = caps[1].parse().ok()?;
        return Some(BudgetRange {
            min: None,
            max: Some((n * 100_000.0).round()),
            currency: Some("INR".to_string()),
        });
    }
    if let Some(caps) = RE_BUDGET_RUPEE.captures(text) {
        let digits: String = caps[1].chars().filter(|c| *c != ',').collect();
        let n: f64 = digits.parse().ok()?;
        return Some(BudgetRange {
            min: None,
            max: Some(n),
            currency: Some("INR".to_string()),
        });
    }
    None
}

/// Parse one raw message into a partial requirement record. All matching runs
/// on a lowercased copy; extracted values keep the lowercased form except
/// locations, which are title-cased.
pub fn parse_message(message: &str) -> RequirementRecord {
    let text = message.to_lowercase();

    let (roles, counted_total) = detect_roles(&text);
    let count = detect_count(&text, counted_total, &roles);

    let mut record = RequirementRecord::default();
    record.company.industry = detect_industry(&text);
    record.hiring = HiringNeeds {
        roles,
        location: detect_location(&text),
        count,
        urgency: RE_URGENCY.is_match(&text).then_some(true),
        timeline: detect_timeline(&text),
        budget: detect_budget(&text),
    };
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counted_roles_with_location_and_timeline() {
        let record = parse_message("3 backend engineers in Mumbai, 2 weeks");
        assert_eq!(record.hiring.roles, vec!["backend engineer"]);
        assert_eq!(record.hiring.count, Some(3));
        assert_eq!(record.hiring.location.as_deref(), Some("Mumbai"));
        assert_eq!(record.hiring.timeline.as_deref(), Some("2 weeks"));
    }

    #[test]
    fn bare_counted_roles() {
        let record = parse_message("Need 2 software engineers");
        assert_eq!(record.hiring.roles, vec!["software engineer"]);
        assert_eq!(record.hiring.count, Some(2));
        assert_eq!(record.hiring.location, None);
    }

    #[test]
    fn location_only_message() {
        let record = parse_message("in Pune");
        assert_eq!(record.hiring.location.as_deref(), Some("Pune"));
        assert!(record.hiring.roles.is_empty());
    }

    #[test]
    fn role_synonyms_normalize_and_collapse() {
        let record = parse_message("2 back-end devs and 1 frontend developer, plus a ui/ux designer");
        assert_eq!(
            record.hiring.roles,
            vec!["backend engineer", "frontend engineer", "ui/ux designer"]
        );
        assert_eq!(record.hiring.count, Some(3));
    }

    #[test]
    fn generic_count_when_no_roles_counted() {
        let record = parse_message("we have 5 openings for our sales team");
        assert_eq!(record.hiring.count, Some(5));
        assert!(record.hiring.roles.contains(&"sales".to_string()));
    }

    #[test]
    fn role_count_falls_back_to_distinct_roles() {
        let record = parse_message("looking for a product manager and a data scientist");
        assert_eq!(
            record.hiring.roles,
            vec!["product manager", "data scientist"]
        );
        assert_eq!(record.hiring.count, Some(2));
    }

    #[test]
    fn budget_lakh_parse() {
        let record = parse_message("budget is 10 lakh");
        let budget = record.hiring.budget.expect("budget");
        assert_eq!(budget.max, Some(1_000_000.0));
        assert_eq!(budget.currency.as_deref(), Some("INR"));
    }

    #[test]
    fn budget_rupee_parse() {
        let record = parse_message("we can spend 50000 rupees");
        let budget = record.hiring.budget.expect("budget");
        assert_eq!(budget.max, Some(50_000.0));
        assert_eq!(budget.currency.as_deref(), Some("INR"));
    }

    #[test]
    fn budget_with_thousands_separators() {
        let record = parse_message("around 150,000 rupees");
        let budget = record.hiring.budget.expect("budget");
        assert_eq!(budget.max, Some(150_000.0));
    }

    #[test]
    fn urgency_keywords() {
        assert_eq!(
            parse_message("need these hires ASAP").hiring.urgency,
            Some(true)
        );
        assert_eq!(parse_message("no rush at all").hiring.urgency, None);
    }

    #[test]
    fn industry_first_match_wins() {
        let record = parse_message("we are a fintech and logistics company");
        assert_eq!(record.company.industry.as_deref(), Some("fintech"));
    }

    #[test]
    fn india_suffix_dropped_from_location() {
        let record = parse_message("hiring in chennai, india");
        assert_eq!(record.hiring.location.as_deref(), Some("Chennai"));
    }

    #[test]
    fn empty_message_yields_empty_record() {
        let record = parse_message("hello there!");
        assert_eq!(record, RequirementRecord::default());
    }
}
