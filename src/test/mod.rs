mod local_group;
mod prefix_sum;
