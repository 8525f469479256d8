//! REST adapter for a Supabase project: GoTrue under `/auth/v1` for
//! credentials and sessions, PostgREST under `/rest/v1` for profile rows.

mod provider;
mod settings;
pub(crate) mod wire;

pub use provider::SupabaseProvider;
pub use settings::SupabaseSettings;
