// Copyright (c) The Tripswitch Project Authors.
// Licensed under the MIT License.

use crate::args::{OnClosedArgs, OnOpenedArgs, OnProbingArgs};
use crate::fn_wrapper::define_fn_wrapper;

define_fn_wrapper!(
    /// Invoked whenever the circuit opens.
    OnOpened(Fn(args: OnOpenedArgs))
);

define_fn_wrapper!(
    /// Invoked when the circuit closes after successful probing.
    OnClosed(Fn(args: OnClosedArgs))
);

define_fn_wrapper!(
    /// Invoked when the circuit admits a probe call.
    OnProbing(Fn(args: OnProbingArgs))
);
