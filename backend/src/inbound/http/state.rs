//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    IngredientsQuery, LoginService, RecipesCommand, RecipesQuery, SubscriptionsCommand,
    SubscriptionsQuery, UsersCommand, UsersQuery,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UsersQuery>,
    pub users_command: Arc<dyn UsersCommand>,
    pub ingredients: Arc<dyn IngredientsQuery>,
    pub recipes: Arc<dyn RecipesQuery>,
    pub recipes_command: Arc<dyn RecipesCommand>,
    pub subscriptions: Arc<dyn SubscriptionsQuery>,
    pub subscriptions_command: Arc<dyn SubscriptionsCommand>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UsersQuery>,
    pub users_command: Arc<dyn UsersCommand>,
    pub ingredients: Arc<dyn IngredientsQuery>,
    pub recipes: Arc<dyn RecipesQuery>,
    pub recipes_command: Arc<dyn RecipesCommand>,
    pub subscriptions: Arc<dyn SubscriptionsQuery>,
    pub subscriptions_command: Arc<dyn SubscriptionsCommand>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use foodgram::domain::{IngredientsService, RecipesService, SubscriptionsService, UsersService};
    /// use foodgram::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// fn state(
    ///     users: Arc<UsersService>,
    ///     ingredients: Arc<IngredientsService>,
    ///     recipes: Arc<RecipesService>,
    ///     subscriptions: Arc<SubscriptionsService>,
    /// ) -> HttpState {
    ///     HttpState::new(HttpStatePorts {
    ///         login: users.clone(),
    ///         users: users.clone(),
    ///         users_command: users,
    ///         ingredients,
    ///         recipes: recipes.clone(),
    ///         recipes_command: recipes,
    ///         subscriptions: subscriptions.clone(),
    ///         subscriptions_command: subscriptions,
    ///     })
    /// }
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            users,
            users_command,
            ingredients,
            recipes,
            recipes_command,
            subscriptions,
            subscriptions_command,
        } = ports;
        Self {
            login,
            users,
            users_command,
            ingredients,
            recipes,
            recipes_command,
            subscriptions,
            subscriptions_command,
        }
    }
}
