mod employee;

use async_graphql::{Context, ErrorExtensions, Object, Schema, SimpleObject, Subscription};
use platform_api::ApiResult;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::{
    Stream, StreamExt,
    wrappers::{BroadcastStream, errors::BroadcastStreamRecvError},
};
use tracing::{instrument, warn};

use crate::hr::{self, HrEvents, SharedHr};

pub use employee::{AddEmployeePayload, EmployeeInput, EmployeeNode, OptionNode};

pub type SchemaType = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

pub fn build_schema(hr: SharedHr, events: HrEvents) -> SchemaType {
    Schema::build(QueryRoot, MutationRoot, SubscriptionRoot)
        .data(hr)
        .data(events)
        .finish()
}

fn roster<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a SharedHr> {
    ctx.data::<SharedHr>()
}

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    #[instrument(name = "graphql.health", skip_all)]
    async fn health(&self) -> ApiResult<HealthPayload> {
        Ok(HealthPayload { ok: true })
    }

    #[instrument(name = "graphql.version", skip_all)]
    async fn version(&self) -> ApiResult<String> {
        Ok(env!("CARGO_PKG_VERSION").to_string())
    }

    /// Every recorded employee, oldest first.
    #[instrument(name = "graphql.employees", skip_all)]
    async fn employees(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<EmployeeNode>> {
        let hr = roster(ctx)?.read().await;
        Ok(employee::nodes(hr.employees()))
    }

    #[instrument(name = "graphql.employee_count", skip_all)]
    async fn employee_count(&self, ctx: &Context<'_>) -> async_graphql::Result<usize> {
        Ok(roster(ctx)?.read().await.employee_count())
    }

    async fn states(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<OptionNode>> {
        let hr = roster(ctx)?.read().await;
        Ok(hr.states().into_iter().map(OptionNode::from).collect())
    }

    async fn departments(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<OptionNode>> {
        let hr = roster(ctx)?.read().await;
        Ok(hr.departments().into_iter().map(OptionNode::from).collect())
    }
}

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    #[instrument(name = "graphql.add_employee", skip_all)]
    async fn add_employee(
        &self,
        ctx: &Context<'_>,
        input: EmployeeInput,
    ) -> async_graphql::Result<AddEmployeePayload> {
        let intake = hr::submit(roster(ctx)?, &input.into())
            .await
            .map_err(|err| err.extend())?;
        Ok(intake.into())
    }
}

#[derive(Default)]
pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// The full roster after each recorded employee.
    async fn employees_changed(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<impl Stream<Item = Vec<EmployeeNode>>> {
        let receiver = ctx.data::<HrEvents>()?.subscribe_roster();
        Ok(live(receiver).map(|roster| employee::nodes(roster.iter().cloned())))
    }

    /// Confirmation notices meant for a one-shot popup.
    async fn notifications(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<impl Stream<Item = String>> {
        Ok(live(ctx.data::<HrEvents>()?.subscribe_notices()))
    }
}

/// Stream a broadcast receiver, skipping whatever a lagging subscriber missed.
fn live<T>(receiver: broadcast::Receiver<T>) -> impl Stream<Item = T>
where
    T: Clone + Send + 'static,
{
    BroadcastStream::new(receiver).filter_map(|event| match event {
        Ok(event) => Some(event),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            warn!(skipped, "subscriber lagged behind roster events");
            None
        }
    })
}

#[derive(Clone, Debug, SimpleObject, Serialize)]
pub struct HealthPayload {
    pub ok: bool,
}
