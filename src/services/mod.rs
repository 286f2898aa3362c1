/// Catalog-backed game logic: song checks, discography searches, daily picks.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Periodic background jobs (idle reclamation, daily refresh).
pub mod scheduler;
/// Storage connection supervisor.
pub mod storage_supervisor;
