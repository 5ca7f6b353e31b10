//! User intents forwarded by a presentation layer.
//!
//! Each intent maps onto exactly one `TodoStore` operation. Intents that name
//! a record by id are resolved against the local collection first; an id the
//! store does not know never reaches the network.

use uuid::Uuid;

use crate::error::StoreError;
use crate::notify::Notification;
use crate::store::TodoStore;
use crate::types::{EditDraft, Todo};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Load,
    SubmitCreate { title: String, description: String },
    RequestEdit(Uuid),
    SubmitEdit(EditDraft),
    ToggleComplete(Uuid),
    RequestDelete(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Loaded(usize),
    Created(Todo),
    Editing(EditDraft),
    Updated(Todo),
    Deleted(Uuid),
}

impl TodoStore {
    pub async fn dispatch(&self, intent: Intent) -> Result<Outcome, StoreError> {
        match intent {
            Intent::Load => self.load().await.map(Outcome::Loaded),
            Intent::SubmitCreate { title, description } => {
                self.create(&title, &description).await.map(Outcome::Created)
            }
            Intent::RequestEdit(id) => {
                let todo = self.known(id)?;
                Ok(Outcome::Editing(self.begin_edit(&todo)))
            }
            Intent::SubmitEdit(draft) => self.save_edit(draft).await.map(Outcome::Updated),
            Intent::ToggleComplete(id) => {
                let todo = self.known(id)?;
                self.toggle_complete(&todo).await.map(Outcome::Updated)
            }
            Intent::RequestDelete(id) => {
                self.known(id)?;
                self.delete(id).await.map(|()| Outcome::Deleted(id))
            }
        }
    }

    fn known(&self, id: Uuid) -> Result<Todo, StoreError> {
        self.get(id).ok_or_else(|| {
            tracing::debug!(%id, "intent for unknown todo");
            self.notify(Notification::error("Todo not found"));
            StoreError::UnknownTodo(id)
        })
    }
}
