use crate::profile::Profile;

/// Serialize a profile to a pretty-printed JSON string.
pub fn to_pretty_json(profile: &Profile) -> String {
    serde_json::to_string_pretty(profile).expect("Profile serialization cannot fail")
}
