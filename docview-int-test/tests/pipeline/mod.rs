mod pipeline_order_test;
mod stage_test;
