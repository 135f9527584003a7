//! Forest Classifier - array-encoded decision-tree ensemble
//!
//! Each tree is a flat node array: interior nodes hold a feature index and
//! threshold (`x[feature] <= threshold` descends left), leaves hold a class.
//! The ensemble votes; the winning fraction is the confidence.

use serde::{Deserialize, Serialize};

use crate::logic::verdict::{Label, Verdict};

use super::DimensionMismatchError;

/// Sentinel child index marking a leaf node
const LEAF: i32 = -1;

/// Maps a normalized vector to a verdict. Read-only after load; safe to
/// share across concurrent predictions.
pub trait Classifier: Send + Sync {
    /// Classify a scaled vector. Width must equal the fitted width.
    fn classify(&self, values: &[f32]) -> Result<Verdict, DimensionMismatchError>;

    /// Width this classifier was fitted on
    fn width(&self) -> usize;
}

/// One node of an array-encoded decision tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    /// Feature slot tested at this node (unused for leaves)
    pub feature: u16,
    /// Split threshold; `x[feature] <= threshold` goes left
    pub threshold: f32,
    /// Index of the left child, or -1 for a leaf
    pub left: i32,
    /// Index of the right child, or -1 for a leaf
    pub right: i32,
    /// Predicted class at a leaf (0 or 1)
    pub class: u8,
}

/// A single decision tree, nodes indexed from the root at 0
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    /// Walk from the root to a leaf. Malformed child indices stop the walk
    /// at the current node's class.
    fn predict(&self, values: &[f32]) -> u8 {
        let mut idx = 0usize;
        loop {
            let Some(node) = self.nodes.get(idx) else {
                return 0;
            };
            if node.left == LEAF || node.right == LEAF {
                return node.class;
            }
            let x = values.get(node.feature as usize).copied().unwrap_or(0.0);
            let next = if x <= node.threshold { node.left } else { node.right };
            if next < 0 || next as usize >= self.nodes.len() {
                return node.class;
            }
            idx = next as usize;
        }
    }
}

/// Fitted parameters of the tree ensemble
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_features: usize,
    pub trees: Vec<Tree>,
}

/// Pre-fitted ensemble classifier
#[derive(Debug, Clone)]
pub struct ForestClassifier {
    n_features: usize,
    trees: Vec<Tree>,
}

impl ForestClassifier {
    /// Build from fitted parameters, rejecting structurally unusable ones.
    pub fn from_params(params: ForestParams) -> Result<Self, String> {
        if params.n_features == 0 {
            return Err("Classifier fitted width is zero".to_string());
        }
        if params.trees.is_empty() {
            return Err("Classifier has no trees".to_string());
        }
        for (i, tree) in params.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(format!("Tree {} has no nodes", i));
            }
            for node in &tree.nodes {
                if node.feature as usize >= params.n_features && node.left != LEAF {
                    return Err(format!(
                        "Tree {} references feature {} beyond fitted width {}",
                        i, node.feature, params.n_features
                    ));
                }
            }
        }

        Ok(Self {
            n_features: params.n_features,
            trees: params.trees,
        })
    }

    pub fn params(&self) -> ForestParams {
        ForestParams {
            n_features: self.n_features,
            trees: self.trees.clone(),
        }
    }
}

impl Classifier for ForestClassifier {
    fn classify(&self, values: &[f32]) -> Result<Verdict, DimensionMismatchError> {
        if values.len() != self.n_features {
            return Err(DimensionMismatchError {
                expected: self.n_features,
                actual: values.len(),
            });
        }

        let phishing_votes = self
            .trees
            .iter()
            .filter(|t| t.predict(values) == 1)
            .count();
        let total = self.trees.len();

        let class = if phishing_votes * 2 >= total { 1 } else { 0 };
        let winning = if class == 1 {
            phishing_votes
        } else {
            total - phishing_votes
        };

        Ok(Verdict::new(
            Label::from_class(class),
            Some(winning as f32 / total as f32),
        ))
    }

    fn width(&self) -> usize {
        self.n_features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::FEATURE_COUNT;

    fn leaf(class: u8) -> TreeNode {
        TreeNode {
            feature: 0,
            threshold: 0.0,
            left: LEAF,
            right: LEAF,
            class,
        }
    }

    /// A stump splitting on slot 0 at threshold 0.5
    fn stump(class_left: u8, class_right: u8) -> Tree {
        Tree {
            nodes: vec![
                TreeNode {
                    feature: 0,
                    threshold: 0.5,
                    left: 1,
                    right: 2,
                    class: 0,
                },
                leaf(class_left),
                leaf(class_right),
            ],
        }
    }

    fn forest(trees: Vec<Tree>) -> ForestClassifier {
        ForestClassifier::from_params(ForestParams {
            n_features: FEATURE_COUNT,
            trees,
        })
        .unwrap()
    }

    #[test]
    fn test_stump_split() {
        let clf = forest(vec![stump(0, 1)]);

        let mut low = vec![0.0; FEATURE_COUNT];
        low[0] = 0.0;
        let verdict = clf.classify(&low).unwrap();
        assert_eq!(verdict.label, Label::Legit);

        let mut high = vec![0.0; FEATURE_COUNT];
        high[0] = 1.0;
        let verdict = clf.classify(&high).unwrap();
        assert_eq!(verdict.label, Label::Phishing);
    }

    #[test]
    fn test_majority_vote_confidence() {
        // Two trees say phishing, one says legit
        let clf = forest(vec![
            Tree { nodes: vec![leaf(1)] },
            Tree { nodes: vec![leaf(1)] },
            Tree { nodes: vec![leaf(0)] },
        ]);

        let verdict = clf.classify(&vec![0.0; FEATURE_COUNT]).unwrap();
        assert_eq!(verdict.label, Label::Phishing);
        let confidence = verdict.confidence.unwrap();
        assert!((confidence - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_width_mismatch_rejected() {
        let clf = forest(vec![Tree { nodes: vec![leaf(0)] }]);
        let err = clf.classify(&vec![0.0; FEATURE_COUNT - 1]).unwrap_err();
        assert_eq!(
            err,
            DimensionMismatchError {
                expected: FEATURE_COUNT,
                actual: FEATURE_COUNT - 1,
            }
        );
    }

    #[test]
    fn test_rejects_empty_forest() {
        let result = ForestClassifier::from_params(ForestParams {
            n_features: FEATURE_COUNT,
            trees: vec![],
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_out_of_range_feature() {
        let result = ForestClassifier::from_params(ForestParams {
            n_features: 4,
            trees: vec![Tree {
                nodes: vec![
                    TreeNode {
                        feature: 9,
                        threshold: 0.0,
                        left: 1,
                        right: 2,
                        class: 0,
                    },
                    leaf(0),
                    leaf(1),
                ],
            }],
        });
        assert!(result.is_err());
    }
}
