/// Flow selected by an emailed identity-provider link. Detected
/// synchronously from the link itself, before any network round trip, so
/// the right view renders immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeepLink {
    /// `type=recovery`: render the new-password form.
    Recovery,
    /// `type=signup`: the verification webhook is still settling; normal
    /// state resolution is suppressed until the provider reports the
    /// sign-in.
    EmailConfirmation,
}

/// Detect a deep link from a pasted URL's fragment (preferred) or query.
pub fn detect(url: &str) -> Option<DeepLink> {
    let params = fragment_or_query(url)?;
    match param_value(params, "type")? {
        "recovery" => Some(DeepLink::Recovery),
        "signup" => Some(DeepLink::EmailConfirmation),
        _ => None,
    }
}

/// Access token attached to a recovery link, used to act on the account
/// before a regular login exists.
pub fn access_token(url: &str) -> Option<String> {
    let params = fragment_or_query(url)?;
    param_value(params, "access_token").map(str::to_string)
}

fn fragment_or_query(url: &str) -> Option<&str> {
    if let Some((_, fragment)) = url.split_once('#') {
        return Some(fragment);
    }
    url.split_once('?').map(|(_, query)| query)
}

fn param_value<'a>(params: &'a str, name: &str) -> Option<&'a str> {
    params
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovery_detected_from_fragment() {
        let url = "https://club.example.co/perfil#access_token=jwt&type=recovery";
        assert_eq!(detect(url), Some(DeepLink::Recovery));
        assert_eq!(access_token(url), Some("jwt".to_string()));
    }

    #[test]
    fn confirmation_detected_from_query() {
        let url = "https://club.example.co/perfil?type=signup";
        assert_eq!(detect(url), Some(DeepLink::EmailConfirmation));
    }

    #[test]
    fn fragment_wins_over_query() {
        let url = "https://club.example.co/perfil?type=signup#type=recovery";
        assert_eq!(detect(url), Some(DeepLink::Recovery));
    }

    #[test]
    fn plain_urls_carry_no_deep_link() {
        assert_eq!(detect("https://club.example.co/perfil"), None);
        assert_eq!(detect("https://club.example.co/perfil#other=1"), None);
        assert_eq!(detect("https://club.example.co/perfil?type=magic"), None);
    }
}
