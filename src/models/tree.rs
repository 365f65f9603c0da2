//! Decision tree classifier.
//!
//! Nodes are stored in pre-order: children always sit at a larger index than
//! their parent and every node except the root has exactly one parent, so
//! traversal and `depth` stay linear for any artifact that passes `validate`. Split nodes send `x[feature] <= threshold` to the left child.

use serde::{Deserialize, Serialize};

use crate::error::ArtifactError;
use crate::models::check_width;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class weights (counts or fractions) at the leaf.
    Leaf { value: Vec<f64> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub n_features: usize,
    pub n_classes: usize,
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], i: usize) -> usize {
            match &nodes[i] {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() { 0 } else { walk(&self.nodes, 0) }
    }

    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.nodes.is_empty() {
            return Err(ArtifactError::invalid("model", "decision tree has no nodes"));
        }
        if self.n_classes < 2 {
            return Err(ArtifactError::invalid("model", "decision tree needs at least two classes"));
        }
        let mut has_parent = vec![false; self.nodes.len()];
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= self.n_features {
                        return Err(ArtifactError::invalid(
                            "model",
                            format!("tree node {i} splits on feature {feature} of {}", self.n_features),
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(ArtifactError::invalid("model", format!("tree node {i} has a non-finite threshold")));
                    }
                    if left == right {
                        return Err(ArtifactError::invalid(
                            "model",
                            format!("tree node {i} uses node {left} for both branches"),
                        ));
                    }
                    for child in [*left, *right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(ArtifactError::invalid(
                                "model",
                                format!("tree node {i} points to invalid child {child}"),
                            ));
                        }
                        if std::mem::replace(&mut has_parent[child], true) {
                            return Err(ArtifactError::invalid(
                                "model",
                                format!("tree node {child} has more than one parent"),
                            ));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != self.n_classes {
                        return Err(ArtifactError::invalid(
                            "model",
                            format!("tree leaf {i} has {} class weights, expected {}", value.len(), self.n_classes),
                        ));
                    }
                    let sum: f64 = value.iter().sum();
                    if value.iter().any(|v| !v.is_finite() || *v < 0.0) || sum <= 0.0 {
                        return Err(ArtifactError::invalid("model", format!("tree leaf {i} has invalid weights")));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, ArtifactError> {
        check_width("decision tree", self.n_features, x)?;
        let mut i = 0;
        for _ in 0..self.nodes.len() {
            match self.nodes.get(i) {
                Some(TreeNode::Leaf { value }) => {
                    let sum: f64 = value.iter().sum();
                    return Ok(value.iter().map(|v| v / sum).collect());
                }
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let v = *x
                        .get(*feature)
                        .ok_or_else(|| ArtifactError::Corrupt(format!("tree feature {feature} out of range")))?;
                    i = if v <= *threshold { *left } else { *right };
                }
                None => return Err(ArtifactError::Corrupt(format!("tree node {i} does not exist"))),
            }
        }
        Err(ArtifactError::Corrupt("tree traversal did not reach a leaf".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump() -> DecisionTree {
        DecisionTree {
            n_features: 2,
            n_classes: 2,
            nodes: vec![
                TreeNode::Split {
                    feature: 0,
                    threshold: 0.5,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: vec![8.0, 2.0] },
                TreeNode::Leaf { value: vec![1.0, 3.0] },
            ],
        }
    }

    #[test]
    fn threshold_is_inclusive_on_the_left() {
        let t = stump();
        t.validate().unwrap();
        assert_eq!(t.predict_proba(&[0.5, 0.0]).unwrap(), vec![0.8, 0.2]);
        assert_eq!(t.predict_proba(&[0.51, 0.0]).unwrap(), vec![0.25, 0.75]);
        assert_eq!(t.depth(), 2);
    }

    #[test]
    fn backward_child_index_is_invalid() {
        let mut t = stump();
        t.nodes[0] = TreeNode::Split {
            feature: 0,
            threshold: 0.5,
            left: 0,
            right: 2,
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn shared_children_are_invalid() {
        // A chain where each split points both ways at the next split would
        // make the recursive depth walk exponential.
        let mut nodes = Vec::new();
        for i in 0..40 {
            nodes.push(TreeNode::Split {
                feature: 0,
                threshold: 0.5,
                left: i + 1,
                right: i + 2,
            });
        }
        nodes.push(TreeNode::Leaf { value: vec![1.0, 1.0] });
        nodes.push(TreeNode::Leaf { value: vec![1.0, 1.0] });
        let t = DecisionTree {
            n_features: 2,
            n_classes: 2,
            nodes,
        };
        let err = t.validate().unwrap_err();
        assert!(err.to_string().contains("node 2 has more than one parent"));

        let mut same = stump();
        same.nodes[0] = TreeNode::Split {
            feature: 0,
            threshold: 0.5,
            left: 1,
            right: 1,
        };
        assert!(same.validate().is_err());
    }

    #[test]
    fn leaf_width_must_match_classes() {
        let mut t = stump();
        t.nodes[1] = TreeNode::Leaf { value: vec![1.0] };
        assert!(t.validate().is_err());
    }

    #[test]
    fn parses_tagged_nodes() {
        let json = r#"{
            "n_features": 1,
            "n_classes": 2,
            "nodes": [
                {"type": "split", "feature": 0, "threshold": 0.0, "left": 1, "right": 2},
                {"type": "leaf", "value": [1.0, 0.0]},
                {"type": "leaf", "value": [0.0, 1.0]}
            ]
        }"#;
        let t: DecisionTree = serde_json::from_str(json).unwrap();
        t.validate().unwrap();
        assert_eq!(t.predict_proba(&[1.0]).unwrap(), vec![0.0, 1.0]);
    }
}
