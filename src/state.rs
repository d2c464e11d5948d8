/*
 * Responsibility
 * - Shared state of the non-GraphQL routes (AppState)
 * - Clone is cheap (PgPool is an Arc inside)
 */
use crate::repos::user_repo::UserRepo;

#[derive(Clone, Debug)]
pub struct AppState {
    pub users: UserRepo,
}

impl AppState {
    pub fn new(users: UserRepo) -> Self {
        Self { users }
    }
}
