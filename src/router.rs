//! Router
//!
//! Maps (method, path shape) to an action through one explicit table.
//!
//! ```text
//! GET    /squirrels        → List
//! GET    /squirrels/{id}   → Retrieve
//! POST   /squirrels        → Create
//! PUT    /squirrels/{id}   → Update
//! DELETE /squirrels/{id}   → Delete
//! anything else            → not found
//! ```

use crate::protocol::Method;

/// The only resource collection served
pub const RESOURCE: &str = "squirrels";

/// Path shapes under the resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathShape {
    /// `/squirrels`
    Collection,

    /// `/squirrels/{id}`
    Member,
}

/// Store-facing actions a request can resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

/// One row of the routing table
#[derive(Debug, Clone, Copy)]
pub struct RouteEntry {
    pub method: RouteMethod,
    pub shape: PathShape,
    pub action: Action,
}

/// Methods that can appear in the routing table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl RouteMethod {
    fn matches(self, method: &Method) -> bool {
        matches!(
            (self, method),
            (RouteMethod::Get, Method::Get)
                | (RouteMethod::Post, Method::Post)
                | (RouteMethod::Put, Method::Put)
                | (RouteMethod::Delete, Method::Delete)
        )
    }
}

/// The routing table
pub const ROUTES: [RouteEntry; 5] = [
    RouteEntry {
        method: RouteMethod::Get,
        shape: PathShape::Collection,
        action: Action::List,
    },
    RouteEntry {
        method: RouteMethod::Get,
        shape: PathShape::Member,
        action: Action::Retrieve,
    },
    RouteEntry {
        method: RouteMethod::Post,
        shape: PathShape::Collection,
        action: Action::Create,
    },
    RouteEntry {
        method: RouteMethod::Put,
        shape: PathShape::Member,
        action: Action::Update,
    },
    RouteEntry {
        method: RouteMethod::Delete,
        shape: PathShape::Member,
        action: Action::Delete,
    },
];

/// Result of resolving a request against [`ROUTES`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMatch<'a> {
    /// A table row matched; `id` is the raw path token for member routes
    Matched { action: Action, id: Option<&'a str> },

    NotFound,
}

/// Split a path into its non-empty segments
///
/// "/squirrels/1" → ["squirrels", "1"]; "/squirrels/" → ["squirrels"]
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Classify a path, returning the id token for member paths
fn shape_of(path: &str) -> Option<(PathShape, Option<&str>)> {
    match segments(path).as_slice() {
        [resource] if *resource == RESOURCE => Some((PathShape::Collection, None)),
        [resource, id] if *resource == RESOURCE => Some((PathShape::Member, Some(*id))),
        _ => None,
    }
}

/// Resolve a method and path (without query string) to an action
pub fn resolve<'a>(method: &Method, path: &'a str) -> RouteMatch<'a> {
    let Some((shape, id)) = shape_of(path) else {
        return RouteMatch::NotFound;
    };

    ROUTES
        .iter()
        .find(|route| route.shape == shape && route.method.matches(method))
        .map(|route| RouteMatch::Matched {
            action: route.action,
            id,
        })
        .unwrap_or(RouteMatch::NotFound)
}
