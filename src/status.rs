//! Status badge tones and labels

/// Display tone of a status badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Primary,
    Success,
    Warning,
    Danger,
    Info,
    Neutral,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Primary => "primary",
            Tone::Success => "success",
            Tone::Warning => "warning",
            Tone::Danger => "danger",
            Tone::Info => "info",
            Tone::Neutral => "neutral",
        }
    }
}

/// Tone for any booking, mechanic, payment, verification or escrow status.
/// Unknown codes are neutral.
pub fn tone(status: &str) -> Tone {
    match status {
        "pending" | "busy" | "refunded" | "held" => Tone::Warning,
        "confirmed" | "escrow" => Tone::Info,
        "in_progress" => Tone::Primary,
        "completed" | "online" | "paid" | "approved" | "released" => Tone::Success,
        "cancelled" | "offline" | "rejected" | "failed" | "blocked" => Tone::Danger,
        "active" => Tone::Success,
        _ => Tone::Neutral,
    }
}

/// Human label for a status code; unknown codes are title-cased word by word
pub fn label(status: &str) -> String {
    let known = match status {
        "pending" => "Pending",
        "confirmed" => "Confirmed",
        "in_progress" => "In Progress",
        "completed" => "Completed",
        "cancelled" => "Cancelled",
        "online" => "Online",
        "offline" => "Offline",
        "busy" => "Busy",
        "paid" => "Paid",
        "refunded" => "Refunded",
        "escrow" => "In Escrow",
        "approved" => "Approved",
        "rejected" => "Rejected",
        "held" => "Held",
        "released" => "Released",
        "failed" => "Failed",
        "active" => "Active",
        "blocked" => "Blocked",
        _ => return title_case(status),
    };
    known.to_string()
}

fn title_case(code: &str) -> String {
    code.split(['_', '-'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Live statuses get a pulsing dot next to the label
pub fn is_live(status: &str) -> bool {
    matches!(status, "online" | "in_progress")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_status_tones() {
        assert_eq!(tone("pending"), Tone::Warning);
        assert_eq!(tone("confirmed"), Tone::Info);
        assert_eq!(tone("in_progress"), Tone::Primary);
        assert_eq!(tone("completed"), Tone::Success);
        assert_eq!(tone("cancelled"), Tone::Danger);
        assert_eq!(tone("something_else"), Tone::Neutral);
    }

    #[test]
    fn test_labels() {
        assert_eq!(label("in_progress"), "In Progress");
        assert_eq!(label("escrow"), "In Escrow");
        assert_eq!(label("mystery"), "Mystery");
        assert_eq!(label("booking_created"), "Booking Created");
        assert_eq!(label("push"), "Push");
        assert!(is_live("online"));
        assert!(!is_live("busy"));
    }
}
