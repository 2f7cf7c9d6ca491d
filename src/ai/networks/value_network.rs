use burn::nn::{Linear, LinearConfig, Relu};
use burn::prelude::*;
use burn::tensor::activation::sigmoid;

/// Feed-forward position evaluator.
///
/// ```text
/// Input:   [batch, input_dim]
/// Input:   input_dim -> hidden_dim, ReLU
/// Hidden:  hidden_dim -> hidden_dim, ReLU   (x hidden_layers)
/// Output:  hidden_dim -> 1, sigmoid
/// ```
///
/// The output reads as X's expected result rescaled to [0, 1]: 1 is an X win,
/// 0 an O win, 0.5 a draw.
#[derive(Module, Debug)]
pub struct ValueNetwork<B: Backend> {
    input: Linear<B>,
    hidden: Vec<Linear<B>>,
    output: Linear<B>,
    relu: Relu,
}

#[derive(Config, Debug)]
pub struct ValueNetworkConfig {
    pub input_dim: usize,
    #[config(default = 1)]
    pub hidden_layers: usize,
    #[config(default = 58)]
    pub hidden_dim: usize,
}

impl ValueNetworkConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ValueNetwork<B> {
        ValueNetwork {
            input: LinearConfig::new(self.input_dim, self.hidden_dim).init(device),
            hidden: (0..self.hidden_layers)
                .map(|_| LinearConfig::new(self.hidden_dim, self.hidden_dim).init(device))
                .collect(),
            output: LinearConfig::new(self.hidden_dim, 1).init(device),
            relu: Relu::new(),
        }
    }
}

impl<B: Backend> ValueNetwork<B> {
    /// Forward pass: input [batch, input_dim] -> output [batch, 1] in (0, 1).
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = self.relu.forward(self.input.forward(input));
        for layer in &self.hidden {
            x = self.relu.forward(layer.forward(x));
        }
        sigmoid(self.output.forward(x))
    }

    /// Number of hidden-to-hidden layers.
    pub fn depth(&self) -> usize {
        self.hidden.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_network_output_shape() {
        let device = Default::default();
        let network = ValueNetworkConfig::new(29).init::<TestBackend>(&device);

        let input = Tensor::zeros([4, 29], &device);
        let output = network.forward(input);
        assert_eq!(output.shape().dims, [4, 1]);
        assert_eq!(network.depth(), 1);
    }

    #[test]
    fn test_output_in_unit_interval() {
        let device = Default::default();
        let network = ValueNetworkConfig::new(128)
            .with_hidden_layers(3)
            .with_hidden_dim(16)
            .init::<TestBackend>(&device);

        let input = Tensor::ones([2, 128], &device);
        let values: Vec<f32> = network.forward(input).into_data().to_vec().unwrap();
        for v in values {
            assert!(v > 0.0 && v < 1.0, "sigmoid output {v} out of range");
        }
        assert_eq!(network.depth(), 3);
    }

    #[test]
    fn test_zero_hidden_layers() {
        let device = Default::default();
        let network = ValueNetworkConfig::new(29)
            .with_hidden_layers(0)
            .init::<TestBackend>(&device);
        let output = network.forward(Tensor::zeros([1, 29], &device));
        assert_eq!(output.shape().dims, [1, 1]);
    }
}
