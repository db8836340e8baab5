use serde::{Deserialize, Serialize};

/// Public display profile, looked up once per match to render the opponent.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerProfile {
    pub user_id: String,
    pub display_name: String,
    pub avatar_id: String,
    pub trophies: i32,
}

impl PlayerProfile {
    /// Stand-in shown when the lookup fails; a missing name must never block
    /// an otherwise valid pairing.
    pub fn placeholder(user_id: &str) -> Self {
        PlayerProfile {
            user_id: user_id.to_string(),
            display_name: "Adversaire".to_string(),
            avatar_id: "tree".to_string(),
            trophies: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_profile() {
        let profile = PlayerProfile::placeholder("opponent-uuid");
        assert_eq!(profile.user_id, "opponent-uuid");
        assert_eq!(profile.display_name, "Adversaire");
        assert_eq!(profile.avatar_id, "tree");
        assert_eq!(profile.trophies, 0);
    }
}
