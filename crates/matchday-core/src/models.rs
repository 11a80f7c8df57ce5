mod fixture;
mod theme;
mod user;

pub use fixture::{FavoriteMatch, Match};
pub use theme::{ColorScheme, ThemePreference};
pub use user::{Credentials, RegistrationData, UserProfile};
