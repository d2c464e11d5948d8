use async_graphql::{Context, EmptyMutation, EmptySubscription, Object, Schema};

use crate::graphql::context::RequestContext;
use crate::services::accounts::UserAccount;

pub type AppSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

pub fn build_schema() -> AppSchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription).finish()
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The account behind the login token, or null for anonymous requests.
    async fn me(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<Account>> {
        let request = ctx.data::<RequestContext>()?;
        Ok(request.user().cloned().map(Account))
    }

    async fn user_id(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<String>> {
        let request = ctx.data::<RequestContext>()?;
        Ok(request.user_id().map(str::to_string))
    }
}

/// GraphQL view of a `UserAccount`. Login token hashes are never exposed.
pub struct Account(UserAccount);

#[Object]
impl Account {
    #[graphql(name = "_id")]
    async fn id(&self) -> String {
        self.0.id.clone()
    }

    async fn username(&self) -> Option<String> {
        self.0.username.clone()
    }

    async fn created_at(&self) -> String {
        self.0.created_at.to_rfc3339()
    }

    async fn session_count(&self) -> i32 {
        i32::try_from(self.0.login_tokens.len()).unwrap_or(i32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::context::ContextMap;
    use crate::services::accounts::testing::account;
    use crate::services::accounts::{Identity, Resolution};
    use async_graphql::{Request, value};
    use chrono::Utc;

    #[tokio::test]
    async fn anonymous_request_sees_no_user() {
        let ctx = RequestContext::merge(ContextMap::new(), Resolution::NotFound);
        let res = build_schema()
            .execute(Request::new("{ me { _id } userId }").data(ctx))
            .await;

        assert!(res.errors.is_empty());
        assert_eq!(res.data, value!({ "me": null, "userId": null }));
    }

    #[tokio::test]
    async fn resolvers_see_the_resolved_account() {
        let user = account("abc", &[("a", Utc::now()), ("b", Utc::now())]);
        let resolution = Resolution::Found(Identity {
            user_id: user.id.clone(),
            user,
        });
        let ctx = RequestContext::merge(ContextMap::new(), resolution);

        let res = build_schema()
            .execute(Request::new("{ me { _id username sessionCount } userId }").data(ctx))
            .await;

        assert!(res.errors.is_empty());
        assert_eq!(
            res.data,
            value!({
                "me": { "_id": "abc", "username": "user-abc", "sessionCount": 2 },
                "userId": "abc",
            })
        );
    }

    #[tokio::test]
    async fn missing_context_is_a_resolver_error() {
        let res = build_schema().execute("{ userId }").await;
        assert_eq!(res.errors.len(), 1);
    }
}
