use super::state::{Outcome, Request};
use crate::api::ResourceClient;
use crate::entity::Entity;

/// Run one prepared request against the API.
///
/// Never fails on its own: every error travels inside the [`Outcome`] so the
/// view can decide how to report it.
pub async fn execute<E: Entity>(client: &ResourceClient, request: Request<E>) -> Outcome<E> {
    let collection = E::COLLECTION;
    match request {
        Request::LoadAll => Outcome::Loaded(client.list(collection).await),
        Request::SearchById(id) => Outcome::Found(client.get(collection, &id).await),
        Request::SearchByFilter { key, value } => {
            Outcome::Filtered(client.filter(collection, key, &value).await)
        }
        Request::Create(draft) => Outcome::Created(client.create(collection, &draft).await),
        Request::Update { id, record } => Outcome::Updated {
            id,
            result: client.update(collection, id, &record).await,
        },
        Request::Delete(id) => Outcome::Deleted {
            id,
            result: client.delete(collection, id).await,
        },
        Request::Related { id } => {
            let result = match E::RELATED {
                Some(spec) => {
                    client
                        .filter(spec.collection, spec.key, &id.to_string())
                        .await
                }
                None => Ok(Vec::new()),
            };
            Outcome::Related { id, result }
        }
    }
}
