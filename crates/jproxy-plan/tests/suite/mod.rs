mod support;

mod members;
