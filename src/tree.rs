//! A named AVL tree of unique integers.

use std::cmp::{self, Ordering};
use std::fmt;

use log::trace;

type Link = Option<Box<Node>>;

/// A node of an [`AvlTree`].
///
/// Every node exclusively owns its children.
/// The height of a leaf is 1, the height of a missing child is 0.
#[derive(Debug)]
pub struct Node {
    key: i64,
    left: Link,
    right: Link,
    height: usize,
}

/// What changed below a node before it is rebalanced.
#[derive(Clone, Copy)]
enum Change {
    Inserted(i64),
    Removed,
}

/// An ordered set of unique integers implemented with an AVL tree.
///
/// ```
/// use dsdb::AvlTree;
/// let mut tree = AvlTree::new("numbers");
/// tree.insert(50);
/// tree.insert(30);
/// tree.insert(70);
/// assert_eq!(tree.in_order_values(), vec![30, 50, 70]);
/// tree.remove(50);
/// assert!(tree.search(50).is_none());
/// ```
#[derive(Debug)]
pub struct AvlTree {
    name: String,
    root: Link,
}

impl AvlTree {
    /// Creates an empty tree.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: None,
        }
    }

    /// Returns the name the tree is registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the tree contains no keys.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of keys in the tree.
    /// The count is not cached, every call walks the whole tree.
    pub fn count(&self) -> usize {
        let mut num_nodes = 0;
        self.traverse_in_order(|_| num_nodes += 1);
        num_nodes
    }

    /// Returns the height of the tree, 0 if it is empty.
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    /// Returns the root node, if any.
    pub fn root(&self) -> Option<&Node> {
        self.root.as_deref()
    }

    /// Drops all nodes.
    pub fn clear(&mut self) {
        self.root = None;
    }

    /// Returns the node holding `key`.
    pub fn search(&self, key: i64) -> Option<&Node> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(&node.key) {
                Ordering::Equal => return Some(node),
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            };
        }
        None
    }

    /// Returns true if the tree contains `key`.
    pub fn contains(&self, key: i64) -> bool {
        self.search(key).is_some()
    }

    /// Inserts a key into the tree.
    /// Returns false and leaves the tree untouched if the key is already present.
    pub fn insert(&mut self, key: i64) -> bool {
        insert_into(&mut self.root, key)
    }

    /// Removes a key from the tree.
    /// Returns whether the key was previously in the tree.
    pub fn remove(&mut self, key: i64) -> bool {
        let removed = remove_from(&mut self.root, key);
        debug_assert!(!self.contains(key));
        removed
    }

    /// Returns all keys in ascending order.
    pub fn in_order_values(&self) -> Vec<i64> {
        let mut values = Vec::new();
        self.traverse_in_order(|node| values.push(node.key));
        values
    }

    /// Calls `f` for every node in ascending key order.
    pub fn traverse_in_order<F: FnMut(&Node)>(&self, mut f: F) {
        fn walk<F: FnMut(&Node)>(link: &Link, f: &mut F) {
            if let Some(node) = link {
                walk(&node.left, f);
                f(node);
                walk(&node.right, f);
            }
        }
        walk(&self.root, &mut f);
    }

    /// Panics if a cached height is stale, a node is out of balance
    /// or the keys are not in strict search tree order.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        // Returns the verified height of the subtree
        fn check(link: &Link, lower: Option<i64>, upper: Option<i64>) -> usize {
            let node = match link {
                None => return 0,
                Some(node) => node,
            };

            // Check search tree order
            if let Some(lower) = lower {
                assert!(node.key > lower);
            }
            if let Some(upper) = upper {
                assert!(node.key < upper);
            }

            let left_height = check(&node.left, lower, Some(node.key));
            let right_height = check(&node.right, Some(node.key), upper);

            // Check height
            assert_eq!(node.height, 1 + cmp::max(left_height, right_height));

            // Check AVL condition (nearly balance)
            assert!(left_height <= right_height + 1);
            assert!(right_height <= left_height + 1);

            node.height
        }

        check(&self.root, None, None);
    }
}

impl fmt::Display for AvlTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tree '{}' in-order:", self.name)?;
        let mut result = Ok(());
        self.traverse_in_order(|node| {
            if result.is_ok() {
                result = write!(f, " {}", node.key);
            }
        });
        result
    }
}

impl Node {
    fn new(key: i64) -> Self {
        Self {
            key,
            left: None,
            right: None,
            height: 1,
        }
    }

    /// Returns the key stored in this node.
    pub fn key(&self) -> i64 {
        self.key
    }

    /// Returns the height of the subtree rooted here, 1 for a leaf.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the left child, holding smaller keys.
    pub fn left(&self) -> Option<&Node> {
        self.left.as_deref()
    }

    /// Returns the right child, holding larger keys.
    pub fn right(&self) -> Option<&Node> {
        self.right.as_deref()
    }

    /// Height of the left subtree minus height of the right subtree.
    pub fn balance(&self) -> isize {
        height(&self.left) as isize - height(&self.right) as isize
    }

    fn adjust_height(&mut self) {
        self.height = 1 + cmp::max(height(&self.left), height(&self.right));
    }
}

fn height(link: &Link) -> usize {
    match link {
        None => 0,
        Some(node) => node.height,
    }
}

fn insert_into(link: &mut Link, key: i64) -> bool {
    let mut node = match link.take() {
        None => {
            *link = Some(Box::new(Node::new(key)));
            return true;
        }
        Some(node) => node,
    };

    let inserted = match key.cmp(&node.key) {
        Ordering::Equal => false,
        Ordering::Less => insert_into(&mut node.left, key),
        Ordering::Greater => insert_into(&mut node.right, key),
    };

    *link = Some(if inserted {
        rebalance(node, Change::Inserted(key))
    } else {
        node
    });
    inserted
}

fn remove_from(link: &mut Link, key: i64) -> bool {
    let mut node = match link.take() {
        None => return false,
        Some(node) => node,
    };

    let removed = match key.cmp(&node.key) {
        Ordering::Less => remove_from(&mut node.left, key),
        Ordering::Greater => remove_from(&mut node.right, key),
        Ordering::Equal => match (node.left.take(), node.right.take()) {
            // Node is stem or leaf, its only child (if any) takes its place
            (None, None) => return true,
            (Some(child), None) | (None, Some(child)) => {
                *link = Some(child);
                return true;
            }
            // Replace key by in-order successor, then remove the successor
            (left, Some(right)) => {
                let successor = min_key(&right);
                node.left = left;
                node.right = Some(right);
                node.key = successor;
                remove_from(&mut node.right, successor)
            }
        },
    };

    *link = Some(if removed {
        rebalance(node, Change::Removed)
    } else {
        node
    });
    removed
}

fn min_key(node: &Node) -> i64 {
    let mut current = node;
    while let Some(left) = current.left.as_deref() {
        current = left;
    }
    current.key
}

/// Restores the AVL condition at `node` and adjusts its height.
/// Initial balance must not exceed +2 or -2, which always holds after a single update.
/// Returns the root of the rebalanced subtree.
fn rebalance(mut node: Box<Node>, change: Change) -> Box<Node> {
    node.adjust_height();
    let balance = node.balance();
    debug_assert!((-2..=2).contains(&balance));

    if balance > 1 {
        // Left heavy
        let left_leans_right = match (change, node.left.as_deref()) {
            (Change::Inserted(key), Some(left)) => key > left.key,
            (Change::Removed, Some(left)) => left.balance() < 0,
            (_, None) => unreachable!("left heavy node without left child"),
        };
        if left_leans_right {
            node.left = node.left.take().map(rotate_left);
        }
        rotate_right(node)
    } else if balance < -1 {
        // Right heavy
        let right_leans_left = match (change, node.right.as_deref()) {
            (Change::Inserted(key), Some(right)) => key < right.key,
            (Change::Removed, Some(right)) => right.balance() > 0,
            (_, None) => unreachable!("right heavy node without right child"),
        };
        if right_leans_left {
            node.right = node.right.take().map(rotate_right);
        }
        rotate_left(node)
    } else {
        node
    }
}

fn rotate_left(mut node: Box<Node>) -> Box<Node> {
    match node.right.take() {
        None => {
            debug_assert!(false, "left rotation without right child");
            node
        }
        Some(mut pivot) => {
            trace!("rotate left at {}", node.key);
            node.right = pivot.left.take();
            node.adjust_height();
            pivot.left = Some(node);
            pivot.adjust_height();
            pivot
        }
    }
}

fn rotate_right(mut node: Box<Node>) -> Box<Node> {
    match node.left.take() {
        None => {
            debug_assert!(false, "right rotation without left child");
            node
        }
        Some(mut pivot) => {
            trace!("rotate right at {}", node.key);
            node.left = pivot.right.take();
            node.adjust_height();
            pivot.right = Some(node);
            pivot.adjust_height();
            pivot
        }
    }
}
