//! Test utilities for the Foodgram crate.
//!
//! [`InMemoryStore`] implements every driven port over plain collections so
//! integration tests in `tests/` can drive the real services and HTTP
//! handlers without PostgreSQL or a media directory. Compiled only with the
//! `test-support` feature.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use pagination::{PageRequest, PageSlice};
use sha2::{Digest, Sha256};

use crate::domain::ports::{
    FollowRepository, FollowRepositoryError, ImageStore, ImageStoreError, IngredientRepository,
    IngredientRepositoryError, MembershipRepository, MembershipRepositoryError, RecipeList,
    RecipeRepository, RecipeRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{
    CartItem, ImageFolder, ImageUpload, Ingredient, IngredientAmount, IngredientFilter,
    IngredientId, IngredientImportService, IngredientsService, MembershipFilter, NewIngredient,
    NewUser, Recipe, RecipeId, RecipeIngredientLine, RecipeOrdering, RecipeQuery, RecipeSummary,
    RecipeWrite, RecipesService, SubscriptionsService, User, UserId, UsersService,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

#[derive(Debug)]
struct StoredUser {
    user: User,
    password_digest: String,
}

#[derive(Debug, Clone)]
struct StoredRecipe {
    recipe: Recipe,
    lines: Vec<IngredientAmount>,
}

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    users: BTreeMap<UserId, StoredUser>,
    follows: BTreeSet<(UserId, UserId)>,
    ingredients: BTreeMap<IngredientId, Ingredient>,
    recipes: BTreeMap<RecipeId, StoredRecipe>,
    favorites: BTreeSet<(UserId, RecipeId)>,
    carts: BTreeSet<(UserId, RecipeId)>,
    images: BTreeSet<String>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn list(&mut self, list: RecipeList) -> &mut BTreeSet<(UserId, RecipeId)> {
        match list {
            RecipeList::Favorites => &mut self.favorites,
            RecipeList::ShoppingCart => &mut self.carts,
        }
    }

    fn membership_allows(
        &self,
        set: &BTreeSet<(UserId, RecipeId)>,
        filter: Option<MembershipFilter>,
        recipe: RecipeId,
    ) -> bool {
        match filter {
            None => true,
            Some(MembershipFilter::Only(user)) => set.contains(&(user, recipe)),
            Some(MembershipFilter::Exclude(user)) => !set.contains(&(user, recipe)),
        }
    }

    fn lines_of(&self, stored: &StoredRecipe) -> Vec<RecipeIngredientLine> {
        let mut lines: Vec<RecipeIngredientLine> = stored
            .lines
            .iter()
            .filter_map(|line| {
                self.ingredients
                    .get(&line.ingredient_id)
                    .map(|ingredient| RecipeIngredientLine {
                        id: ingredient.id,
                        name: ingredient.name.clone(),
                        measurement_unit: ingredient.measurement_unit.clone(),
                        amount: line.amount,
                    })
            })
            .collect();
        lines.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        lines
    }

    fn remove_recipe_memberships(&mut self, recipe: RecipeId) {
        self.favorites.retain(|(_, id)| *id != recipe);
        self.carts.retain(|(_, id)| *id != recipe);
    }
}

fn digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

fn paged<T: Clone>(items: &[T], page: &PageRequest) -> PageSlice<T> {
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
    let slice = items.iter().skip(offset).take(limit).cloned().collect();
    PageSlice::new(slice, items.len() as u64)
}

/// Shared in-memory backing store.
///
/// Clones share state, so one store can be handed to several services.
///
/// # Examples
/// ```
/// use foodgram::test_support::InMemoryStore;
///
/// let store = InMemoryStore::default();
/// let flour = store.seed_ingredient("flour", "g");
/// assert!(flour.get() > 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Insert an ingredient directly and return its id.
    pub fn seed_ingredient(&self, name: &str, measurement_unit: &str) -> IngredientId {
        let mut state = self.lock();
        let id = IngredientId::new(state.next_id());
        state.ingredients.insert(
            id,
            Ingredient {
                id,
                name: name.to_owned(),
                measurement_unit: measurement_unit.to_owned(),
            },
        );
        id
    }

    /// Grant administrator rights to an existing user.
    pub fn promote_to_staff(&self, id: UserId) {
        if let Some(stored) = self.lock().users.get_mut(&id) {
            stored.user.is_staff = true;
        }
    }

    /// Stored image paths, sorted.
    pub fn image_paths(&self) -> Vec<String> {
        self.lock().images.iter().cloned().collect()
    }

    /// Number of stored ingredients.
    pub fn ingredient_count(&self) -> usize {
        self.lock().ingredients.len()
    }

    /// Build HTTP state wired to the real services over this store.
    pub fn http_state(&self, clock: Arc<dyn Clock>) -> HttpState {
        let store = Arc::new(self.clone());
        let users = Arc::new(UsersService::new(store.clone(), store.clone(), store.clone()));
        let recipes = Arc::new(
            RecipesService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                store.clone(),
                store.clone(),
                store.clone(),
            )
            .with_clock(clock),
        );
        let subscriptions = Arc::new(SubscriptionsService::new(
            store.clone(),
            store.clone(),
            store.clone(),
        ));
        let ingredients = Arc::new(IngredientsService::new(store));
        HttpState::new(HttpStatePorts {
            login: users.clone(),
            users: users.clone(),
            users_command: users,
            ingredients,
            recipes: recipes.clone(),
            recipes_command: recipes,
            subscriptions: subscriptions.clone(),
            subscriptions_command: subscriptions,
        })
    }

    /// Ingredient importer writing into this store.
    pub fn importer(&self) -> IngredientImportService {
        IngredientImportService::new(Arc::new(self.clone()))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut state = self.lock();
        for stored in state.users.values() {
            if stored.user.email.eq_ignore_ascii_case(&user.email) {
                return Err(UserPersistenceError::duplicate("email"));
            }
            if stored.user.username == user.username {
                return Err(UserPersistenceError::duplicate("username"));
            }
        }
        let id = UserId::new(state.next_id());
        let created = User {
            id,
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            avatar: None,
            is_staff: false,
        };
        state.users.insert(
            id,
            StoredUser {
                user: created.clone(),
                password_digest: digest(user.password.as_str()),
            },
        );
        Ok(created)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock().users.get(&id).map(|stored| stored.user.clone()))
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        let state = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id).map(|stored| stored.user.clone()))
            .collect())
    }

    async fn list(&self, page: &PageRequest) -> Result<PageSlice<User>, UserPersistenceError> {
        let state = self.lock();
        let mut users: Vec<User> = state
            .users
            .values()
            .map(|stored| stored.user.clone())
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(paged(&users, page))
    }

    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserId>, UserPersistenceError> {
        let wanted = digest(password);
        Ok(self
            .lock()
            .users
            .values()
            .find(|stored| {
                stored.user.email.eq_ignore_ascii_case(email) && stored.password_digest == wanted
            })
            .map(|stored| stored.user.id))
    }

    async fn set_avatar(
        &self,
        id: UserId,
        avatar: Option<String>,
    ) -> Result<Option<String>, UserPersistenceError> {
        let mut state = self.lock();
        let stored = state
            .users
            .get_mut(&id)
            .ok_or_else(|| UserPersistenceError::query(format!("user {id} vanished")))?;
        Ok(std::mem::replace(&mut stored.user.avatar, avatar))
    }
}

#[async_trait]
impl FollowRepository for InMemoryStore {
    async fn follow(&self, follower: UserId, author: UserId) -> Result<bool, FollowRepositoryError> {
        Ok(self.lock().follows.insert((follower, author)))
    }

    async fn unfollow(
        &self,
        follower: UserId,
        author: UserId,
    ) -> Result<bool, FollowRepositoryError> {
        Ok(self.lock().follows.remove(&(follower, author)))
    }

    async fn followed_among(
        &self,
        follower: UserId,
        authors: &[UserId],
    ) -> Result<Vec<UserId>, FollowRepositoryError> {
        let state = self.lock();
        Ok(authors
            .iter()
            .copied()
            .filter(|author| state.follows.contains(&(follower, *author)))
            .collect())
    }

    async fn followed_authors(
        &self,
        follower: UserId,
        page: &PageRequest,
    ) -> Result<PageSlice<User>, FollowRepositoryError> {
        let state = self.lock();
        let mut authors: Vec<User> = state
            .follows
            .iter()
            .filter(|(who, _)| *who == follower)
            .filter_map(|(_, author)| state.users.get(author).map(|stored| stored.user.clone()))
            .collect();
        authors.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(paged(&authors, page))
    }
}

#[async_trait]
impl IngredientRepository for InMemoryStore {
    async fn list(
        &self,
        filter: &IngredientFilter,
    ) -> Result<Vec<Ingredient>, IngredientRepositoryError> {
        let mut found: Vec<Ingredient> = self
            .lock()
            .ingredients
            .values()
            .filter(|ingredient| filter.matches(ingredient))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn find_by_id(
        &self,
        id: IngredientId,
    ) -> Result<Option<Ingredient>, IngredientRepositoryError> {
        Ok(self.lock().ingredients.get(&id).cloned())
    }

    async fn find_many(
        &self,
        ids: &[IngredientId],
    ) -> Result<Vec<Ingredient>, IngredientRepositoryError> {
        let state = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| state.ingredients.get(id).cloned())
            .collect())
    }

    async fn insert_if_absent(
        &self,
        ingredient: &NewIngredient,
    ) -> Result<bool, IngredientRepositoryError> {
        let mut state = self.lock();
        let exists = state.ingredients.values().any(|stored| {
            stored.name == ingredient.name()
                && stored.measurement_unit == ingredient.measurement_unit()
        });
        if exists {
            return Ok(false);
        }
        let id = IngredientId::new(state.next_id());
        state.ingredients.insert(
            id,
            Ingredient {
                id,
                name: ingredient.name().to_owned(),
                measurement_unit: ingredient.measurement_unit().to_owned(),
            },
        );
        Ok(true)
    }
}

#[async_trait]
impl RecipeRepository for InMemoryStore {
    async fn create(
        &self,
        author: UserId,
        recipe: &RecipeWrite,
    ) -> Result<Recipe, RecipeRepositoryError> {
        let image = recipe
            .image
            .clone()
            .ok_or_else(|| RecipeRepositoryError::query("recipe image is required"))?;
        let mut state = self.lock();
        let raw_id = state.next_id();
        let id = RecipeId::new(raw_id);
        let stored = Recipe {
            id,
            author_id: author,
            name: recipe.name.clone(),
            image,
            text: recipe.text.clone(),
            cooking_time: recipe.cooking_time,
            pub_date: DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(raw_id),
        };
        state.recipes.insert(
            id,
            StoredRecipe {
                recipe: stored.clone(),
                lines: recipe.ingredients.clone(),
            },
        );
        Ok(stored)
    }

    async fn update(
        &self,
        id: RecipeId,
        recipe: &RecipeWrite,
    ) -> Result<Recipe, RecipeRepositoryError> {
        let mut state = self.lock();
        let stored = state
            .recipes
            .get_mut(&id)
            .ok_or_else(|| RecipeRepositoryError::query(format!("recipe {id} vanished")))?;
        stored.recipe.name.clone_from(&recipe.name);
        stored.recipe.text.clone_from(&recipe.text);
        stored.recipe.cooking_time = recipe.cooking_time;
        if let Some(image) = &recipe.image {
            stored.recipe.image.clone_from(image);
        }
        stored.lines.clone_from(&recipe.ingredients);
        Ok(stored.recipe.clone())
    }

    async fn delete(&self, id: RecipeId) -> Result<bool, RecipeRepositoryError> {
        let mut state = self.lock();
        let removed = state.recipes.remove(&id).is_some();
        if removed {
            state.remove_recipe_memberships(id);
        }
        Ok(removed)
    }

    async fn find_by_id(&self, id: RecipeId) -> Result<Option<Recipe>, RecipeRepositoryError> {
        Ok(self
            .lock()
            .recipes
            .get(&id)
            .map(|stored| stored.recipe.clone()))
    }

    async fn list(
        &self,
        query: &RecipeQuery,
        page: &PageRequest,
    ) -> Result<PageSlice<Recipe>, RecipeRepositoryError> {
        let state = self.lock();
        let mut found: Vec<Recipe> = state
            .recipes
            .values()
            .map(|stored| &stored.recipe)
            .filter(|recipe| query.author.is_none_or(|author| recipe.author_id == author))
            .filter(|recipe| {
                query
                    .search
                    .as_deref()
                    .is_none_or(|needle| recipe.name.to_lowercase().contains(needle))
            })
            .filter(|recipe| state.membership_allows(&state.favorites, query.favorited, recipe.id))
            .filter(|recipe| {
                state.membership_allows(&state.carts, query.in_shopping_cart, recipe.id)
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| match query.ordering {
            RecipeOrdering::PubDateAsc => a.pub_date.cmp(&b.pub_date).then(a.id.cmp(&b.id)),
            RecipeOrdering::PubDateDesc => b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)),
            RecipeOrdering::NameAsc => a.name.cmp(&b.name).then(a.id.cmp(&b.id)),
            RecipeOrdering::NameDesc => b.name.cmp(&a.name).then(b.id.cmp(&a.id)),
        });
        Ok(paged(&found, page))
    }

    async fn ingredient_lines(
        &self,
        ids: &[RecipeId],
    ) -> Result<Vec<(RecipeId, RecipeIngredientLine)>, RecipeRepositoryError> {
        let state = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| state.recipes.get(id))
            .flat_map(|stored| {
                state
                    .lines_of(stored)
                    .into_iter()
                    .map(|line| (stored.recipe.id, line))
            })
            .collect())
    }

    async fn by_author(
        &self,
        author: UserId,
        limit: Option<u32>,
    ) -> Result<PageSlice<RecipeSummary>, RecipeRepositoryError> {
        let state = self.lock();
        let mut own: Vec<&Recipe> = state
            .recipes
            .values()
            .map(|stored| &stored.recipe)
            .filter(|recipe| recipe.author_id == author)
            .collect();
        own.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        let total = own.len() as u64;
        let take = limit.map_or(usize::MAX, |limit| {
            usize::try_from(limit).unwrap_or(usize::MAX)
        });
        Ok(PageSlice::new(
            own.into_iter().take(take).map(Recipe::summary).collect(),
            total,
        ))
    }

    async fn cart_items(&self, user: UserId) -> Result<Vec<CartItem>, RecipeRepositoryError> {
        let state = self.lock();
        let authors: HashMap<UserId, String> = state
            .users
            .values()
            .map(|stored| (stored.user.id, stored.user.username.clone()))
            .collect();
        Ok(state
            .carts
            .iter()
            .filter(|(owner, _)| *owner == user)
            .filter_map(|(_, recipe)| state.recipes.get(recipe))
            .flat_map(|stored| {
                let author = authors
                    .get(&stored.recipe.author_id)
                    .cloned()
                    .unwrap_or_default();
                state
                    .lines_of(stored)
                    .into_iter()
                    .map(move |line| CartItem {
                        recipe_id: stored.recipe.id,
                        recipe_name: stored.recipe.name.clone(),
                        author_username: author.clone(),
                        ingredient_name: line.name,
                        measurement_unit: line.measurement_unit,
                        amount: line.amount,
                    })
            })
            .collect())
    }
}

#[async_trait]
impl MembershipRepository for InMemoryStore {
    async fn add(
        &self,
        list: RecipeList,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<bool, MembershipRepositoryError> {
        Ok(self.lock().list(list).insert((user, recipe)))
    }

    async fn remove(
        &self,
        list: RecipeList,
        user: UserId,
        recipe: RecipeId,
    ) -> Result<bool, MembershipRepositoryError> {
        Ok(self.lock().list(list).remove(&(user, recipe)))
    }

    async fn contained(
        &self,
        list: RecipeList,
        user: UserId,
        recipes: &[RecipeId],
    ) -> Result<Vec<RecipeId>, MembershipRepositoryError> {
        let mut state = self.lock();
        let set = state.list(list);
        Ok(recipes
            .iter()
            .copied()
            .filter(|recipe| set.contains(&(user, *recipe)))
            .collect())
    }
}

#[async_trait]
impl ImageStore for InMemoryStore {
    async fn save(
        &self,
        folder: ImageFolder,
        image: &ImageUpload,
    ) -> Result<String, ImageStoreError> {
        let mut state = self.lock();
        let path = format!(
            "{}/{}.{}",
            folder.path(),
            state.next_id(),
            image.kind().extension()
        );
        state.images.insert(path.clone());
        Ok(path)
    }

    async fn remove(&self, path: &str) -> Result<(), ImageStoreError> {
        self.lock().images.remove(path);
        Ok(())
    }
}
