use crate::core::instance_header::InstanceHeader;

pub trait Instance {
    fn weight(&self) -> f64;
    fn value_at_index(&self, index: usize) -> Option<f64>;
    fn number_of_features(&self) -> usize;
    fn class_value(&self) -> Option<f64>;
    fn is_class_missing(&self) -> bool {
        self.class_value().is_none()
    }
    fn number_of_classes(&self) -> usize {
        self.header().number_of_classes()
    }
    fn features(&self) -> &[f64];
    fn header(&self) -> &InstanceHeader;
}
