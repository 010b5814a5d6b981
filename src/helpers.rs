use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Subscribed,
    Unsubscribed,
    NotSubscribed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Status::Subscribed => write!(f, "The subscription was created."),
            Status::Unsubscribed => write!(f, "The subscription was deleted."),
            Status::NotSubscribed => {
                write!(f, "The subscription was not found.")
            },
        }
    }
}

impl From<Status> for String {
    fn from(value: Status) -> Self {
        value.to_string()
    }
}

/// Short human-readable device label derived from the User-Agent header,
/// stored for the admin listing and the free-text search.
pub fn describe_device(user_agent: &str) -> String {
    let browser = if user_agent.contains("Edg/") {
        "Edge"
    } else if user_agent.contains("OPR/") || user_agent.contains("Opera") {
        "Opera"
    } else if user_agent.contains("Firefox/") {
        "Firefox"
    } else if user_agent.contains("Chrome/") {
        "Chrome"
    } else if user_agent.contains("Safari/") {
        "Safari"
    } else {
        "Unknown browser"
    };

    let platform = if user_agent.contains("Android") {
        "Android"
    } else if user_agent.contains("iPhone") || user_agent.contains("iPad") {
        "iOS"
    } else if user_agent.contains("Windows") {
        "Windows"
    } else if user_agent.contains("Mac OS X") {
        "macOS"
    } else if user_agent.contains("Linux") {
        "Linux"
    } else {
        "unknown platform"
    };

    format!("{} on {}", browser, platform)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_device_common_agents() {
        let chrome_win = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";
        assert_eq!(describe_device(chrome_win), "Chrome on Windows");

        let firefox_linux =
            "Mozilla/5.0 (X11; Linux x86_64; rv:127.0) Gecko/20100101 Firefox/127.0";
        assert_eq!(describe_device(firefox_linux), "Firefox on Linux");

        let safari_ios = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Mobile/15E148 Safari/604.1";
        assert_eq!(describe_device(safari_ios), "Safari on iOS");

        // Edge ships the Chrome token as well; Edg/ wins
        let edge_win = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36 Edg/126.0.2592.87";
        assert_eq!(describe_device(edge_win), "Edge on Windows");
    }

    #[test]
    fn test_describe_device_unknown_agent() {
        assert_eq!(
            describe_device("curl/8.5.0"),
            "Unknown browser on unknown platform"
        );
    }

    #[test]
    fn test_status_messages() {
        assert_eq!(
            String::from(Status::Subscribed),
            "The subscription was created."
        );
        assert_eq!(
            String::from(Status::NotSubscribed),
            "The subscription was not found."
        );
    }
}
