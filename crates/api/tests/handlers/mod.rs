mod availability_test;
mod slots_test;
