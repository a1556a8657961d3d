pub mod audio;
pub mod auth;
pub mod desktop;
pub mod email;
pub mod storage;
pub mod store;
pub mod supabase;

pub use audio::RodioPlayer;
pub use auth::GoTrueAuthAdapter;
pub use desktop::DesktopNotifier;
pub use email::EmailJsAdapter;
pub use storage::SupabaseStorageAdapter;
pub use store::PostgrestAdapter;
pub use supabase::SupabaseClient;
