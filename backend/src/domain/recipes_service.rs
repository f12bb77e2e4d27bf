//! Recipe use-cases: listing, publishing, editing, memberships, and the
//! shopping-list download.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use pagination::{PageRequest, PageSlice};

use crate::domain::ports::{
    FollowRepository, ImageStore, IngredientRepository, MembershipRepository, RecipeList,
    RecipeRepository, RecipesCommand, RecipesQuery, UserRepository,
};
use crate::domain::recipe::unknown_ingredients_error;
use crate::domain::recipe_query::invalid_author_message;
use crate::domain::service_support::{discard_image, profiles_for};
use crate::domain::{
    Error, FIELD_REQUIRED, FieldErrors, ImageFolder, IngredientId, Recipe, RecipeDraft, RecipeId,
    RecipeIngredientLine, RecipeInput, RecipeListParams, RecipeSummary, RecipeView, ShoppingList,
    UserId, UserProfile, Viewer, WriteMode,
};

const FORBIDDEN: &str = "You do not have permission to perform this action.";

/// Recipe service implementing [`RecipesQuery`] and [`RecipesCommand`].
#[derive(Clone)]
pub struct RecipesService {
    recipes: Arc<dyn RecipeRepository>,
    ingredients: Arc<dyn IngredientRepository>,
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
    memberships: Arc<dyn MembershipRepository>,
    images: Arc<dyn ImageStore>,
    clock: Arc<dyn Clock>,
}

fn membership_conflict(list: RecipeList, present: bool) -> Error {
    let (message, code) = match (list, present) {
        (RecipeList::Favorites, true) => ("Recipe is already in favorites.", "already_favorited"),
        (RecipeList::Favorites, false) => ("Recipe is not in favorites.", "not_favorited"),
        (RecipeList::ShoppingCart, true) => (
            "Recipe is already in the shopping cart.",
            "already_in_shopping_cart",
        ),
        (RecipeList::ShoppingCart, false) => (
            "Recipe is not in the shopping cart.",
            "not_in_shopping_cart",
        ),
    };
    Error::conflict_with_code(message, code)
}

impl RecipesService {
    /// Create a new service with the given adapters and the system clock.
    pub fn new(
        recipes: Arc<dyn RecipeRepository>,
        ingredients: Arc<dyn IngredientRepository>,
        users: Arc<dyn UserRepository>,
        follows: Arc<dyn FollowRepository>,
        memberships: Arc<dyn MembershipRepository>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            recipes,
            ingredients,
            users,
            follows,
            memberships,
            images,
            clock: Arc::new(DefaultClock),
        }
    }

    /// Replace the clock used to date shopping-list reports.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    async fn find(&self, id: RecipeId) -> Result<Recipe, Error> {
        self.recipes
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("recipe {id} not found")))
    }

    async fn ensure_can_modify(&self, user_id: UserId, recipe: &Recipe) -> Result<(), Error> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(Error::not_authenticated)?;
        if recipe.can_be_modified_by(&user) {
            Ok(())
        } else {
            Err(Error::forbidden(FORBIDDEN))
        }
    }

    async fn ensure_ingredients_exist(&self, draft: &RecipeDraft) -> Result<(), Error> {
        let wanted = draft.ingredient_ids();
        let found: HashSet<IngredientId> = self
            .ingredients
            .find_many(&wanted)
            .await?
            .into_iter()
            .map(|ingredient| ingredient.id)
            .collect();
        let missing: Vec<IngredientId> = wanted
            .into_iter()
            .filter(|id| !found.contains(id))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(unknown_ingredients_error(&missing))
        }
    }

    async fn contained(
        &self,
        list: RecipeList,
        viewer: Viewer,
        ids: &[RecipeId],
    ) -> Result<HashSet<RecipeId>, Error> {
        match viewer.user_id() {
            Some(user) => Ok(self
                .memberships
                .contained(list, user, ids)
                .await?
                .into_iter()
                .collect()),
            None => Ok(HashSet::new()),
        }
    }

    /// Assemble full views, batching every lookup across `recipes`.
    async fn views(&self, viewer: Viewer, recipes: Vec<Recipe>) -> Result<Vec<RecipeView>, Error> {
        if recipes.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<RecipeId> = recipes.iter().map(|recipe| recipe.id).collect();
        let mut author_ids: Vec<UserId> = recipes.iter().map(|recipe| recipe.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors = self.users.find_many(&author_ids).await?;
        let authors: HashMap<UserId, UserProfile> =
            profiles_for(self.follows.as_ref(), viewer, authors)
                .await?
                .into_iter()
                .map(|profile| (profile.id, profile))
                .collect();

        let mut lines: HashMap<RecipeId, Vec<RecipeIngredientLine>> = HashMap::new();
        for (recipe_id, line) in self.recipes.ingredient_lines(&ids).await? {
            lines.entry(recipe_id).or_default().push(line);
        }
        let favorited = self.contained(RecipeList::Favorites, viewer, &ids).await?;
        let in_cart = self.contained(RecipeList::ShoppingCart, viewer, &ids).await?;

        recipes
            .into_iter()
            .map(|recipe| {
                let author = authors.get(&recipe.author_id).cloned().ok_or_else(|| {
                    Error::internal(format!(
                        "author {} of recipe {} is missing",
                        recipe.author_id, recipe.id
                    ))
                })?;
                Ok(RecipeView {
                    id: recipe.id,
                    author,
                    ingredients: lines.remove(&recipe.id).unwrap_or_default(),
                    is_favorited: favorited.contains(&recipe.id),
                    is_in_shopping_cart: in_cart.contains(&recipe.id),
                    name: recipe.name,
                    image: recipe.image,
                    text: recipe.text,
                    cooking_time: recipe.cooking_time,
                })
            })
            .collect()
    }

    async fn view(&self, viewer: Viewer, recipe: Recipe) -> Result<RecipeView, Error> {
        self.views(viewer, vec![recipe])
            .await?
            .pop()
            .ok_or_else(|| Error::internal("recipe view assembly dropped a recipe"))
    }
}

#[async_trait]
impl RecipesQuery for RecipesService {
    async fn list(
        &self,
        viewer: Viewer,
        params: RecipeListParams,
        page: &PageRequest,
    ) -> Result<PageSlice<RecipeView>, Error> {
        let query = params.into_query(viewer)?;
        if let Some(author) = query.author {
            if self.users.find_by_id(author).await?.is_none() {
                return Err(FieldErrors::single(
                    "author",
                    invalid_author_message(&author.to_string()),
                ));
            }
        }
        let slice = self.recipes.list(&query, page).await?;
        let views = self.views(viewer, slice.items).await?;
        Ok(PageSlice::new(views, slice.total))
    }

    async fn get(&self, viewer: Viewer, id: RecipeId) -> Result<RecipeView, Error> {
        let recipe = self.find(id).await?;
        self.view(viewer, recipe).await
    }

    async fn ensure_exists(&self, id: RecipeId) -> Result<(), Error> {
        self.find(id).await.map(|_| ())
    }

    async fn shopping_list(&self, viewer: Viewer) -> Result<String, Error> {
        let user = viewer.require()?;
        let items = self.recipes.cart_items(user).await?;
        let list = ShoppingList::aggregate(items).ok_or_else(|| {
            Error::conflict_with_code(
                "Your shopping list is empty or its recipes have no ingredients.",
                "empty_shopping_cart",
            )
        })?;
        Ok(list.render(self.clock.local().date_naive()))
    }
}

#[async_trait]
impl RecipesCommand for RecipesService {
    async fn create(&self, viewer: Viewer, input: RecipeInput) -> Result<RecipeView, Error> {
        let author = viewer.require()?;
        let draft = input.validate(WriteMode::Create)?;
        self.ensure_ingredients_exist(&draft).await?;
        let Some(image) = draft.image.as_ref() else {
            return Err(FieldErrors::single("image", FIELD_REQUIRED));
        };
        let path = self.images.save(ImageFolder::RecipeImages, image).await?;
        let write = draft.into_write(Some(path.clone()));
        let recipe = match self.recipes.create(author, &write).await {
            Ok(recipe) => recipe,
            Err(error) => {
                discard_image(self.images.as_ref(), &path).await;
                return Err(error.into());
            }
        };
        self.view(viewer, recipe).await
    }

    async fn update(
        &self,
        viewer: Viewer,
        id: RecipeId,
        input: RecipeInput,
        mode: WriteMode,
    ) -> Result<RecipeView, Error> {
        let user = viewer.require()?;
        let existing = self.find(id).await?;
        self.ensure_can_modify(user, &existing).await?;
        let draft = input.validate(mode)?;
        self.ensure_ingredients_exist(&draft).await?;

        let new_path = match draft.image.as_ref() {
            Some(image) => Some(self.images.save(ImageFolder::RecipeImages, image).await?),
            None => None,
        };
        let write = draft.into_write(new_path.clone());
        let updated = match self.recipes.update(id, &write).await {
            Ok(recipe) => recipe,
            Err(error) => {
                if let Some(path) = &new_path {
                    discard_image(self.images.as_ref(), path).await;
                }
                return Err(error.into());
            }
        };
        if new_path.is_some() && existing.image != updated.image {
            discard_image(self.images.as_ref(), &existing.image).await;
        }
        self.view(viewer, updated).await
    }

    async fn delete(&self, viewer: Viewer, id: RecipeId) -> Result<(), Error> {
        let user = viewer.require()?;
        let recipe = self.find(id).await?;
        self.ensure_can_modify(user, &recipe).await?;
        if self.recipes.delete(id).await? {
            discard_image(self.images.as_ref(), &recipe.image).await;
        }
        Ok(())
    }

    async fn add_to_list(
        &self,
        viewer: Viewer,
        list: RecipeList,
        id: RecipeId,
    ) -> Result<RecipeSummary, Error> {
        let user = viewer.require()?;
        let recipe = self.find(id).await?;
        if !self.memberships.add(list, user, id).await? {
            return Err(membership_conflict(list, true));
        }
        Ok(recipe.summary())
    }

    async fn remove_from_list(
        &self,
        viewer: Viewer,
        list: RecipeList,
        id: RecipeId,
    ) -> Result<(), Error> {
        let user = viewer.require()?;
        self.find(id).await?;
        if !self.memberships.remove(list, user, id).await? {
            return Err(membership_conflict(list, false));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "recipes_service_tests.rs"]
mod tests;
