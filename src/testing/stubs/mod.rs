pub mod oracle_classifier;
