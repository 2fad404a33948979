use uuid::Uuid;

/// Generates a fresh random identifier for records whose key is a UUID.
pub fn generate_id() -> Uuid {
    Uuid::new_v4()
}
