//! Request Handler
//!
//! Turns one parsed request into one store operation and one response.
//!
//! ## Status selection
//! - Route miss, unknown id, or an id that is not a number → 404
//! - Malformed or incomplete form body → 400
//! - Store failure (IO, corrupt file) → 500
//!
//! PUT and DELETE look the squirrel up before touching the store, so a miss
//! never parses the body or writes the file.

use std::sync::Arc;

use crate::error::Result;
use crate::protocol::{Form, Request, Response, StatusCode};
use crate::router::{resolve, Action, RouteMatch};
use crate::store::{parse_id, Squirrel, SquirrelRepository};

/// Handler function referenced by a routed action
type HandlerFn<S> = fn(&Handler<S>, &Request, Option<&str>) -> Result<Response>;

/// Stateless request handler holding a store reference
pub struct Handler<S> {
    store: Arc<S>,
}

impl<S> Clone for Handler<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: SquirrelRepository> Handler<S> {
    /// Create a handler over a shared store
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Get the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handle a request
    ///
    /// Never fails: every error becomes a response.
    pub fn handle(&self, request: &Request) -> Response {
        let response = match resolve(&request.method, request.route_path()) {
            RouteMatch::Matched { action, id } => {
                let handler = Self::action_fn(action);
                match handler(self, request, id) {
                    Ok(response) => response,
                    Err(e) if e.is_client_error() => {
                        tracing::warn!(
                            "Rejected {} {}: {}",
                            request.method.as_str(),
                            request.path,
                            e
                        );
                        Response::bad_request()
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed {} {}: {}",
                            request.method.as_str(),
                            request.path,
                            e
                        );
                        Response::internal_error()
                    }
                }
            }
            RouteMatch::NotFound => Response::not_found(),
        };

        tracing::debug!(
            "{} {} -> {}",
            request.method.as_str(),
            request.path,
            response.status.code()
        );
        response
    }

    /// Handler function for each action
    fn action_fn(action: Action) -> HandlerFn<S> {
        match action {
            Action::List => Self::list,
            Action::Retrieve => Self::retrieve,
            Action::Create => Self::create,
            Action::Update => Self::update,
            Action::Delete => Self::delete,
        }
    }

    // =========================================================================
    // Actions
    // =========================================================================

    fn list(&self, _request: &Request, _id: Option<&str>) -> Result<Response> {
        let squirrels = self.store.get_all()?;
        Response::json(StatusCode::Ok, &squirrels)
    }

    fn retrieve(&self, _request: &Request, id: Option<&str>) -> Result<Response> {
        match self.lookup(id)? {
            Some(squirrel) => Response::json(StatusCode::Ok, &squirrel),
            None => Ok(Response::not_found()),
        }
    }

    fn create(&self, request: &Request, _id: Option<&str>) -> Result<Response> {
        let form = Form::parse(&request.body)?;
        let name = form.require("name")?;
        let size = form.require("size")?;

        self.store.create(name, size)?;
        Ok(Response::empty(StatusCode::Created))
    }

    fn update(&self, request: &Request, id: Option<&str>) -> Result<Response> {
        let Some(existing) = self.lookup(id)? else {
            return Ok(Response::not_found());
        };

        let form = Form::parse(&request.body)?;
        let name = form.require("name")?;
        let size = form.require("size")?;

        match self.store.update(existing.id, name, size)? {
            Some(_) => Ok(Response::empty(StatusCode::NoContent)),
            None => Ok(Response::not_found()),
        }
    }

    fn delete(&self, _request: &Request, id: Option<&str>) -> Result<Response> {
        let Some(existing) = self.lookup(id)? else {
            return Ok(Response::not_found());
        };

        match self.store.delete(existing.id)? {
            Some(_) => Ok(Response::empty(StatusCode::NoContent)),
            None => Ok(Response::not_found()),
        }
    }

    /// Find the squirrel named by a raw path token
    fn lookup(&self, id: Option<&str>) -> Result<Option<Squirrel>> {
        match id.and_then(parse_id) {
            Some(id) => self.store.get_by_id(id),
            None => Ok(None),
        }
    }
}
