#![cfg(test)]
mod convergence;
mod probing;
