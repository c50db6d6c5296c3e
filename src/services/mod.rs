pub mod classifier;
pub mod features;
pub mod indicators;
pub mod ledger;
pub mod predictor;
pub mod sqlite_store;

pub use classifier::{Classifier, RandomForestClassifier, TrainedModel};
pub use features::{build_features, FeatureRow, FeatureSet, FEATURE_NAMES};
pub use indicators::{compute_indicators, IndicatorEngine, IndicatorRow};
pub use ledger::PredictionLedger;
pub use predictor::{Prediction, Predictor};
pub use sqlite_store::SqliteStore;
