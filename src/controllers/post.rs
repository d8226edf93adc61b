use std::sync::Arc;

use crate::core::context::Context;
use crate::core::error::Error;
use crate::store::Repository;
use crate::types::post::{Post, PostDraft};
use crate::types::request::PostData;

#[derive(Clone)]
pub(crate) struct PostController {
    repository: Arc<dyn Repository<Post>>,
}

impl PostController {
    pub(crate) fn new(repository: Arc<dyn Repository<Post>>) -> Self {
        Self { repository }
    }

    pub(crate) async fn create(&self, ctx: &Context, data: PostData) -> Result<Post, Error> {
        self.repository.create(ctx, draft(data)?).await
    }

    pub(crate) async fn get_all(&self, ctx: &Context) -> Result<Vec<Post>, Error> {
        self.repository.get_all(ctx).await
    }

    pub(crate) async fn get_one(&self, ctx: &Context, id: i32) -> Result<Post, Error> {
        self.repository.get_one(ctx, id).await
    }

    pub(crate) async fn update(&self, ctx: &Context, id: i32, data: PostData) -> Result<(), Error> {
        self.repository.update(ctx, id, draft(data)?).await
    }

    pub(crate) async fn delete(&self, ctx: &Context, id: i32) -> Result<(), Error> {
        self.repository.delete(ctx, id).await
    }
}

// the author reference itself is checked by the store
fn draft(data: PostData) -> Result<PostDraft, Error> {
    if data.content.trim().is_empty() {
        return Err(Error::Validation("Content is required".into()));
    }

    Ok(PostDraft {
        user_id: data.user_id,
        content: data.content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use crate::types::user::{User, UserDraft};
    use std::time::Duration;

    fn ctx() -> Context {
        Context::with_timeout(Duration::from_secs(5))
    }

    async fn setup() -> (PostController, i32) {
        let store = Arc::new(MemoryStore::new());
        let user = Repository::<User>::create(
            store.as_ref(),
            &ctx(),
            UserDraft {
                username: "alice".into(),
                password_hash: "hash".into(),
            },
        )
        .await
        .unwrap();

        (PostController::new(store), user.id)
    }

    #[tokio::test]
    async fn test_post_crud() {
        let (controller, user_id) = setup().await;

        let post = controller
            .create(
                &ctx(),
                PostData {
                    user_id,
                    content: "first".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(post.user_id, user_id);

        controller
            .update(
                &ctx(),
                post.id,
                PostData {
                    user_id,
                    content: "edited".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(
            controller.get_one(&ctx(), post.id).await.unwrap().content,
            "edited"
        );

        assert_eq!(controller.get_all(&ctx()).await.unwrap().len(), 1);

        controller.delete(&ctx(), post.id).await.unwrap();
        assert!(matches!(
            controller.get_one(&ctx(), post.id).await,
            Err(Error::NotFound("Post"))
        ));
    }

    #[tokio::test]
    async fn test_empty_content_is_rejected() {
        let (controller, user_id) = setup().await;

        let result = controller
            .create(
                &ctx(),
                PostData {
                    user_id,
                    content: "   ".into(),
                },
            )
            .await;

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_unknown_author_is_rejected() {
        let (controller, user_id) = setup().await;

        let result = controller
            .create(
                &ctx(),
                PostData {
                    user_id: user_id + 1,
                    content: "hello".into(),
                },
            )
            .await;

        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
