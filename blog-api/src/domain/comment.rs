use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::DomainError;
use super::user::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Comment {
    pub(crate) id: Uuid,
    pub(crate) content: String,
    pub(crate) post_id: Uuid,
    pub(crate) author_id: Uuid,
    pub(crate) parent_id: Option<Uuid>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Comment {
    /// A reply must stay within the post of its parent.
    pub(crate) fn accepts_reply_on(&self, post_id: Uuid) -> Result<(), DomainError> {
        if self.post_id != post_id {
            return Err(DomainError::Validation {
                field: "parent_id",
                message: "parent comment does not belong to the same post",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CreateCommentRequest {
    pub(crate) content: String,
    pub(crate) parent_id: Option<Uuid>,
}

impl CreateCommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            content: normalize_content(&self.content)?,
            parent_id: self.parent_id,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct UpdateCommentRequest {
    pub(crate) content: String,
}

impl UpdateCommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            content: normalize_content(&self.content)?,
        })
    }
}

/// A comment with its author and the replies below it.
#[derive(Debug, Clone)]
pub(crate) struct CommentThread {
    pub(crate) comment: Comment,
    pub(crate) author: Option<User>,
    pub(crate) replies: Vec<CommentThread>,
}

impl CommentThread {
    /// Depth-first search for the subtree rooted at `id`.
    pub(crate) fn find(threads: Vec<CommentThread>, id: Uuid) -> Option<CommentThread> {
        let mut stack = threads;
        while let Some(thread) = stack.pop() {
            if thread.comment.id == id {
                return Some(thread);
            }
            stack.extend(thread.replies);
        }
        None
    }
}

/// Deepest reply level accepted below a top-level comment.
pub(crate) const MAX_REPLY_DEPTH: usize = 32;

/// `depth` is the level the new reply would sit at, top-level comments being 0.
pub(crate) fn ensure_reply_depth(depth: usize) -> Result<(), DomainError> {
    if depth > MAX_REPLY_DEPTH {
        return Err(DomainError::invalid("parent_id", "reply nesting too deep"));
    }
    Ok(())
}

/// Arranges a post's comments into reply trees, keeping the input order among
/// siblings. Comments whose parent is not in `entries` (for example a deleted
/// one) become roots, as do comments caught in a parent cycle. Replies nested
/// deeper than [`MAX_REPLY_DEPTH`] are hung under their ancestor one level
/// above the cap, so no tree is ever deeper than the cap.
pub(crate) fn thread_comments(entries: Vec<(Comment, Option<User>)>) -> Vec<CommentThread> {
    let index: HashMap<Uuid, usize> = entries
        .iter()
        .enumerate()
        .map(|(i, (comment, _))| (comment.id, i))
        .collect();
    let mut parent: Vec<Option<usize>> = entries
        .iter()
        .map(|(comment, _)| {
            comment
                .parent_id
                .filter(|parent_id| *parent_id != comment.id)
                .and_then(|parent_id| index.get(&parent_id).copied())
        })
        .collect();

    let depth = resolve_depths(&mut parent);

    // Ancestor at MAX_REPLY_DEPTH - 1 of every comment at or below that level.
    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by_key(|&i| depth[i]);
    let mut anchor: Vec<usize> = (0..entries.len()).collect();
    for &i in &order {
        if depth[i] + 1 > MAX_REPLY_DEPTH
            && let Some(p) = parent[i]
        {
            anchor[i] = anchor[p];
            if depth[i] > MAX_REPLY_DEPTH {
                parent[i] = Some(anchor[p]);
            }
        }
    }
    let level: Vec<usize> = depth.iter().map(|&d| d.min(MAX_REPLY_DEPTH)).collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); entries.len()];
    let mut roots = Vec::new();
    for (i, p) in parent.iter().enumerate() {
        match p {
            Some(p) => children[*p].push(i),
            None => roots.push(i),
        }
    }

    // Deepest level first, so every reply is built before its parent.
    order.sort_by_key(|&i| std::cmp::Reverse(level[i]));
    let mut pending: Vec<Option<(Comment, Option<User>)>> = entries.into_iter().map(Some).collect();
    let mut built: Vec<Option<CommentThread>> = (0..pending.len()).map(|_| None).collect();
    for i in order {
        let Some((comment, author)) = pending[i].take() else {
            continue;
        };
        let replies = children[i]
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        built[i] = Some(CommentThread {
            comment,
            author,
            replies,
        });
    }

    roots
        .into_iter()
        .filter_map(|root| built[root].take())
        .collect()
}

enum Walk {
    Known(usize),
    Root,
    Cycle(usize),
}

/// Level of every comment below its root, computed without recursion. A
/// comment that closes a parent cycle is detached and becomes a root.
fn resolve_depths(parent: &mut [Option<usize>]) -> Vec<usize> {
    let mut depth: Vec<Option<usize>> = vec![None; parent.len()];
    let mut on_path = vec![false; parent.len()];

    for start in 0..parent.len() {
        loop {
            let mut path = Vec::new();
            let mut current = start;
            let walk = loop {
                if let Some(known) = depth[current] {
                    break Walk::Known(known);
                }
                if on_path[current] {
                    break Walk::Cycle(current);
                }
                on_path[current] = true;
                path.push(current);
                match parent[current] {
                    Some(p) => current = p,
                    None => break Walk::Root,
                }
            };
            for &node in &path {
                on_path[node] = false;
            }

            let mut next = match walk {
                Walk::Known(known) => known + 1,
                Walk::Root => 0,
                Walk::Cycle(node) => {
                    parent[node] = None;
                    continue;
                }
            };
            for &node in path.iter().rev() {
                depth[node] = Some(next);
                next += 1;
            }
            break;
        }
    }

    depth.into_iter().map(|d| d.unwrap_or(0)).collect()
}

fn normalize_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::Validation {
            field: "content",
            message: "must not be empty",
        });
    }
    Ok(content.to_string())
}
