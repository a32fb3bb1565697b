use serde::{Serialize, Deserialize};

#[derive(Serialize, Deserialize, Clone)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub bio: String,
    pub profile_picture: String,
    pub website: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub followers: Vec<String>,
    #[serde(default)]
    pub following: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Outward representation of an account. The password hash lives only on
/// the persisted record; this is the shape that crosses the HTTP boundary.
#[derive(Serialize, Clone)]
pub struct AccountProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub bio: String,
    pub profile_picture: String,
    pub website: Option<String>,
    pub location: Option<String>,
    pub is_private: bool,
    pub followers: Vec<String>,
    pub following: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Account> for AccountProfile {
    fn from(account: &Account) -> Self {
        AccountProfile {
            id: account.id.clone(),
            name: account.name.clone(),
            email: account.email.clone(),
            bio: account.bio.clone(),
            profile_picture: account.profile_picture.clone(),
            website: account.website.clone(),
            location: account.location.clone(),
            is_private: account.is_private,
            followers: account.followers.clone(),
            following: account.following.clone(),
            created_at: account.created_at.clone(),
            updated_at: account.updated_at.clone(),
        }
    }
}
